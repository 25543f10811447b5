//! Response Models
//!
//! Strongly typed snapshots of ECM responses, each built from a single
//! response frame and able to render itself as indented JSON. The JSON
//! layout (two-space indent, key order, `null` for missing descriptions,
//! two-decimal parameter values) is stable output format, not serde-driven.

use std::fmt::Write;

use serde::Serialize;

use crate::error::ConsultError;
use crate::faults::FaultCode;
use crate::params::EngineParameter;

/// Identifying metadata about the ECU.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EcuMetadata {
    /// The ECU part number. May contain whitespace and other
    /// non-alphanumeric characters.
    pub part_number: String,
}

impl EcuMetadata {
    /// Parse the 22-byte part number response frame.
    pub fn from_frame(frame: &[u8]) -> Result<EcuMetadata, ConsultError> {
        if frame.len() != 22 {
            return Err(ConsultError::ShortFrame(format!(
                "ECU metadata frame must be 22 bytes, got {}",
                frame.len()
            )));
        }
        let part_number = format!(
            "{:02X}{:02X} 23710-{:X}{:02X}{:02X}",
            frame[2], frame[3], frame[19], frame[20], frame[21]
        );
        Ok(EcuMetadata { part_number })
    }

    pub fn to_json(&self) -> String {
        format!("{{\n  \"part_number\": \"{}\"\n}}", self.part_number)
    }
}

/// A single observed fault and how stale it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FaultCodeData {
    /// The fault the ECU observed.
    pub code: FaultCode,
    /// Engine starts since the fault was last seen.
    pub starts_since_observed: u8,
}

impl FaultCodeData {
    /// Parse a single 2-byte fault entry.
    pub fn from_frame(frame: &[u8]) -> Result<FaultCodeData, ConsultError> {
        if frame.len() != 2 {
            return Err(ConsultError::ShortFrame(format!(
                "fault code entry must be 2 bytes, got {}",
                frame.len()
            )));
        }
        Ok(FaultCodeData {
            code: FaultCode::from_id(frame[0])?,
            starts_since_observed: frame[1],
        })
    }

    pub fn to_json(&self) -> String {
        self.json_object(0)
    }

    fn json_object(&self, indent: usize) -> String {
        let pad = " ".repeat(indent);
        let description = match self.code.description() {
            Some(text) => format!("\"{text}\""),
            None => String::from("null"),
        };
        format!(
            "{pad}{{\n\
             {pad}  \"code\": {},\n\
             {pad}  \"name\": \"{}\",\n\
             {pad}  \"description\": {},\n\
             {pad}  \"starts_since_observed\": {}\n\
             {pad}}}",
            self.code.id(),
            self.code.name(),
            description,
            self.starts_since_observed
        )
    }
}

/// All fault codes reported by a single read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FaultCodes {
    pub codes: Vec<FaultCodeData>,
}

impl FaultCodes {
    /// Parse a fault code response frame: zero or more 2-byte entries.
    pub fn from_frame(frame: &[u8]) -> Result<FaultCodes, ConsultError> {
        if frame.len() % 2 != 0 {
            return Err(ConsultError::ShortFrame(format!(
                "fault codes frame must have even length, got {}",
                frame.len()
            )));
        }
        let codes = frame
            .chunks_exact(2)
            .map(FaultCodeData::from_frame)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(FaultCodes { codes })
    }

    pub fn to_json(&self) -> String {
        let mut out = String::from("[");
        let mut separator = "\n";
        for data in &self.codes {
            out.push_str(separator);
            out.push_str(&data.json_object(2));
            separator = ",\n";
        }
        out.push_str("\n]");
        out
    }
}

/// A snapshot of one or more engine parameter values, in request order.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineParameters {
    values: Vec<(EngineParameter, f64)>,
}

impl EngineParameters {
    /// Decode a response frame against the parameter list it was requested
    /// with. The frame must hold exactly the bytes the parameters consume.
    pub fn from_frame(
        params: &[EngineParameter],
        frame: &[u8],
    ) -> Result<EngineParameters, ConsultError> {
        let mut rest = frame;
        let mut values = Vec::with_capacity(params.len());
        for &param in params {
            values.push((param, param.decode(&mut rest)?));
        }
        if !rest.is_empty() {
            return Err(ConsultError::ShortFrame(format!(
                "{} trailing byte(s) in engine parameters frame",
                rest.len()
            )));
        }
        Ok(EngineParameters { values })
    }

    /// The value of `param`, if it was part of the request.
    pub fn get(&self, param: EngineParameter) -> Option<f64> {
        self.values
            .iter()
            .find(|(candidate, _)| *candidate == param)
            .map(|&(_, value)| value)
    }

    /// Parameter/value pairs in request order.
    pub fn iter(&self) -> impl Iterator<Item = (EngineParameter, f64)> + '_ {
        self.values.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn to_json(&self) -> String {
        let mut out = String::from("{");
        let mut separator = "\n";
        for &(param, value) in &self.values {
            out.push_str(separator);
            // write! to a String cannot fail.
            let _ = write!(out, "  \"{}\": {:.2}", param.id(), value);
            separator = ",\n";
        }
        out.push_str("\n}");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ecu_metadata_part_number() {
        let frame = [
            0x00, 0x21, 0x14, 0x80, 0x20, 0x00, 0x00, 0x3f, 0x80, 0x80, 0xe2, 0x20, 0x00,
            0x00, 0x28, 0xff, 0xff, 0x41, 0x41, 0x35, 0x30, 0x32,
        ];
        let metadata = EcuMetadata::from_frame(&frame).unwrap();
        assert_eq!(metadata.part_number, "1480 23710-353032");
    }

    #[test]
    fn test_ecu_metadata_to_json() {
        let frame = [
            0x00, 0x00, 0x04, 0x88, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x05, 0x0f, 0x00,
        ];
        let metadata = EcuMetadata::from_frame(&frame).unwrap();
        assert_eq!(
            metadata.to_json(),
            "{\n  \"part_number\": \"0488 23710-50F00\"\n}"
        );
    }

    #[test]
    fn test_ecu_metadata_wrong_length() {
        assert!(matches!(
            EcuMetadata::from_frame(&[0x00; 21]),
            Err(ConsultError::ShortFrame(_))
        ));
    }

    #[test]
    fn test_fault_code_data_to_json() {
        let data = FaultCodeData::from_frame(&[51, 42]).unwrap();
        assert_eq!(data.code, FaultCode::FuelInjector);
        assert_eq!(
            data.to_json(),
            "{\n\
             \x20 \"code\": 51,\n\
             \x20 \"name\": \"Injector Circuit\",\n\
             \x20 \"description\": null,\n\
             \x20 \"starts_since_observed\": 42\n\
             }"
        );
    }

    #[test]
    fn test_fault_codes_to_json() {
        let codes = FaultCodes::from_frame(&[34, 13, 45, 17]).unwrap();
        assert_eq!(
            codes.to_json(),
            "[\n\
             \x20 {\n\
             \x20   \"code\": 34,\n\
             \x20   \"name\": \"Knock sensor signal circuit\",\n\
             \x20   \"description\": \"At least one knock sensor indicates the output voltage \
             of approx. 4V or greater (open circuit) or less than approx. 1V (short \
             circuit).\",\n\
             \x20   \"starts_since_observed\": 13\n\
             \x20 },\n\
             \x20 {\n\
             \x20   \"code\": 45,\n\
             \x20   \"name\": \"Injector Leak\",\n\
             \x20   \"description\": null,\n\
             \x20   \"starts_since_observed\": 17\n\
             \x20 }\n\
             ]"
        );
    }

    #[test]
    fn test_fault_codes_empty_frame() {
        let codes = FaultCodes::from_frame(&[]).unwrap();
        assert!(codes.codes.is_empty());
    }

    #[test]
    fn test_fault_codes_odd_frame() {
        assert!(matches!(
            FaultCodes::from_frame(&[34, 13, 45]),
            Err(ConsultError::ShortFrame(_))
        ));
    }

    #[test]
    fn test_fault_codes_unknown_id() {
        assert!(matches!(
            FaultCodes::from_frame(&[0xfe, 1]),
            Err(ConsultError::UnknownFaultCode(0xfe))
        ));
    }

    #[test]
    fn test_engine_parameters_decode_in_request_order() {
        let params = [
            EngineParameter::EngineRpm,
            EngineParameter::VehicleSpeed,
            EngineParameter::BatteryVoltage,
        ];
        let values = EngineParameters::from_frame(&params, &[0x00, 0x75, 0x00, 0xb4]).unwrap();
        assert_eq!(values.len(), 3);
        assert_eq!(values.get(EngineParameter::EngineRpm), Some(1462.5));
        assert_eq!(values.get(EngineParameter::VehicleSpeed), Some(0.0));
        assert_eq!(values.get(EngineParameter::BatteryVoltage), Some(14.4));
        assert_eq!(values.get(EngineParameter::AacValve), None);
    }

    #[test]
    fn test_engine_parameters_to_json() {
        let params = [EngineParameter::EngineRpm, EngineParameter::BatteryVoltage];
        let values = EngineParameters::from_frame(&params, &[0x01, 0x59, 0x97]).unwrap();
        assert_eq!(
            values.to_json(),
            "{\n  \"engine_speed_rpm\": 4312.50,\n  \"battery_v\": 12.08\n}"
        );
    }

    #[test]
    fn test_rendered_json_is_well_formed() {
        let frame = [
            0x00, 0x00, 0x04, 0x88, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x05, 0x0f, 0x00,
        ];
        let metadata = EcuMetadata::from_frame(&frame).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&metadata.to_json()).unwrap();
        assert_eq!(parsed["part_number"], "0488 23710-50F00");

        let codes = FaultCodes::from_frame(&[34, 13, 45, 17]).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&codes.to_json()).unwrap();
        assert_eq!(parsed[0]["code"], 34);
        assert_eq!(parsed[1]["description"], serde_json::Value::Null);

        let params = [EngineParameter::EngineRpm, EngineParameter::BatteryVoltage];
        let values = EngineParameters::from_frame(&params, &[0x01, 0x59, 0x97]).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&values.to_json()).unwrap();
        assert_eq!(parsed["engine_speed_rpm"], 4312.5);
        assert_eq!(parsed["battery_v"], 12.08);
    }

    #[test]
    fn test_engine_parameters_short_frame() {
        let params = [EngineParameter::EngineRpm];
        assert!(matches!(
            EngineParameters::from_frame(&params, &[0x01]),
            Err(ConsultError::ShortFrame(_))
        ));
    }

    #[test]
    fn test_engine_parameters_trailing_bytes() {
        let params = [EngineParameter::BatteryVoltage];
        assert!(matches!(
            EngineParameters::from_frame(&params, &[0x97, 0x00]),
            Err(ConsultError::ShortFrame(_))
        ));
    }
}
