//! Engine Parameter Coding
//!
//! Maps the logical engine parameters onto the ECM register ids used to
//! request them and the scalar decode of the returned bytes. For engines
//! with a single cylinder bank, use the `Lh` parameter variants.

use serde::{Deserialize, Serialize};

use crate::error::ConsultError;

/// ECM register ids. One register always holds one byte of data; multi-byte
/// quantities are split across an MSB/LSB register pair.
mod reg {
    pub const CRANKSHAFT_RPM_MSB: u8 = 0x00;
    pub const CRANKSHAFT_RPM_LSB: u8 = 0x01;
    pub const LH_MAF_VOLTAGE_MSB: u8 = 0x04;
    pub const LH_MAF_VOLTAGE_LSB: u8 = 0x05;
    pub const RH_MAF_VOLTAGE_MSB: u8 = 0x06;
    pub const RH_MAF_VOLTAGE_LSB: u8 = 0x07;
    pub const COOLANT_TEMP: u8 = 0x08;
    pub const LH_O2_SENSOR_VOLTAGE: u8 = 0x09;
    pub const RH_O2_SENSOR_VOLTAGE: u8 = 0x0A;
    pub const VEHICLE_SPEED: u8 = 0x0B;
    pub const BATTERY_VOLTAGE: u8 = 0x0C;
    pub const THROTTLE_POSITION: u8 = 0x0D;
    pub const FUEL_TEMP: u8 = 0x0F;
    pub const INTAKE_AIR_TEMP: u8 = 0x11;
    pub const EXHAUST_GAS_TEMP: u8 = 0x12;
    pub const DIGITAL_BIT_REGISTER1: u8 = 0x13;
    pub const LH_INJECTION_TIMING_MSB: u8 = 0x14;
    pub const LH_INJECTION_TIMING_LSB: u8 = 0x15;
    pub const IGNITION_TIMING: u8 = 0x16;
    pub const AAC_VALVE: u8 = 0x17;
    pub const LH_AF_ALPHA: u8 = 0x1A;
    pub const RH_AF_ALPHA: u8 = 0x1B;
    pub const LH_AF_ALPHA_SELFLEARN: u8 = 0x1C;
    pub const RH_AF_ALPHA_SELFLEARN: u8 = 0x1D;
    pub const DIGITAL_BIT_REGISTER2: u8 = 0x1E;
    pub const DIGITAL_BIT_REGISTER3: u8 = 0x1F;
    pub const MR_FC_MNT: u8 = 0x21;
    pub const RH_INJECTION_TIMING_MSB: u8 = 0x22;
    pub const RH_INJECTION_TIMING_LSB: u8 = 0x23;
    pub const PURGE_CONTROL_VALVE: u8 = 0x25;
    pub const TANK_FUEL_TEMP: u8 = 0x26;
    pub const FPCM_DR_VOLTAGE: u8 = 0x27;
    pub const WASTE_GATE_SOLENOID: u8 = 0x28;
    pub const TURBO_BOOST_SENSOR: u8 = 0x29;
    pub const ENGINE_MOUNT: u8 = 0x2A;
    pub const POSITION_COUNTER: u8 = 0x2E;
    pub const FUEL_GAUGE_VOLTAGE: u8 = 0x2F;
}

/// A logical engine signal that can be queried from the ECU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EngineParameter {
    EngineRpm,
    LhMafVoltage,
    RhMafVoltage,
    CoolantTemperature,
    LhO2SensorVoltage,
    RhO2SensorVoltage,
    VehicleSpeed,
    BatteryVoltage,
    ThrottlePosition,
    FuelTemperature,
    IntakeAirTemperature,
    ExhaustGasTemperature,
    LhInjectionTiming,
    RhInjectionTiming,
    IgnitionTiming,
    AacValve,
    LhAirFuelAlpha,
    RhAirFuelAlpha,
    LhAirFuelAlphaSelfLearn,
    RhAirFuelAlphaSelfLearn,
    MrFcMnt,
    WasteGateSolenoid,
    TurboBoostSensor,
    EngineMount,
    PositionCounter,
    PurgeControlValve,
    TankFuelTemperature,
    FpcmDrVoltage,
    FuelGaugeVoltage,
    DigitalBitRegister1,
    DigitalBitRegister2,
    DigitalBitRegister3,
}

fn word(hi: u8, lo: u8) -> f64 {
    f64::from((u16::from(hi) << 8) | u16::from(lo))
}

impl EngineParameter {
    /// Every defined parameter, in declaration order.
    pub const ALL: [EngineParameter; 32] = [
        EngineParameter::EngineRpm,
        EngineParameter::LhMafVoltage,
        EngineParameter::RhMafVoltage,
        EngineParameter::CoolantTemperature,
        EngineParameter::LhO2SensorVoltage,
        EngineParameter::RhO2SensorVoltage,
        EngineParameter::VehicleSpeed,
        EngineParameter::BatteryVoltage,
        EngineParameter::ThrottlePosition,
        EngineParameter::FuelTemperature,
        EngineParameter::IntakeAirTemperature,
        EngineParameter::ExhaustGasTemperature,
        EngineParameter::LhInjectionTiming,
        EngineParameter::RhInjectionTiming,
        EngineParameter::IgnitionTiming,
        EngineParameter::AacValve,
        EngineParameter::LhAirFuelAlpha,
        EngineParameter::RhAirFuelAlpha,
        EngineParameter::LhAirFuelAlphaSelfLearn,
        EngineParameter::RhAirFuelAlphaSelfLearn,
        EngineParameter::MrFcMnt,
        EngineParameter::WasteGateSolenoid,
        EngineParameter::TurboBoostSensor,
        EngineParameter::EngineMount,
        EngineParameter::PositionCounter,
        EngineParameter::PurgeControlValve,
        EngineParameter::TankFuelTemperature,
        EngineParameter::FpcmDrVoltage,
        EngineParameter::FuelGaugeVoltage,
        EngineParameter::DigitalBitRegister1,
        EngineParameter::DigitalBitRegister2,
        EngineParameter::DigitalBitRegister3,
    ];

    /// The ECM registers holding this parameter, most significant first.
    /// The register count equals the number of response bytes the parameter
    /// decodes from.
    pub fn registers(&self) -> &'static [u8] {
        match self {
            EngineParameter::EngineRpm => &[reg::CRANKSHAFT_RPM_MSB, reg::CRANKSHAFT_RPM_LSB],
            EngineParameter::LhMafVoltage => &[reg::LH_MAF_VOLTAGE_MSB, reg::LH_MAF_VOLTAGE_LSB],
            EngineParameter::RhMafVoltage => &[reg::RH_MAF_VOLTAGE_MSB, reg::RH_MAF_VOLTAGE_LSB],
            EngineParameter::CoolantTemperature => &[reg::COOLANT_TEMP],
            EngineParameter::LhO2SensorVoltage => &[reg::LH_O2_SENSOR_VOLTAGE],
            EngineParameter::RhO2SensorVoltage => &[reg::RH_O2_SENSOR_VOLTAGE],
            EngineParameter::VehicleSpeed => &[reg::VEHICLE_SPEED],
            EngineParameter::BatteryVoltage => &[reg::BATTERY_VOLTAGE],
            EngineParameter::ThrottlePosition => &[reg::THROTTLE_POSITION],
            EngineParameter::FuelTemperature => &[reg::FUEL_TEMP],
            EngineParameter::IntakeAirTemperature => &[reg::INTAKE_AIR_TEMP],
            EngineParameter::ExhaustGasTemperature => &[reg::EXHAUST_GAS_TEMP],
            EngineParameter::LhInjectionTiming => {
                &[reg::LH_INJECTION_TIMING_MSB, reg::LH_INJECTION_TIMING_LSB]
            }
            EngineParameter::RhInjectionTiming => {
                &[reg::RH_INJECTION_TIMING_MSB, reg::RH_INJECTION_TIMING_LSB]
            }
            EngineParameter::IgnitionTiming => &[reg::IGNITION_TIMING],
            EngineParameter::AacValve => &[reg::AAC_VALVE],
            EngineParameter::LhAirFuelAlpha => &[reg::LH_AF_ALPHA],
            EngineParameter::RhAirFuelAlpha => &[reg::RH_AF_ALPHA],
            EngineParameter::LhAirFuelAlphaSelfLearn => &[reg::LH_AF_ALPHA_SELFLEARN],
            EngineParameter::RhAirFuelAlphaSelfLearn => &[reg::RH_AF_ALPHA_SELFLEARN],
            EngineParameter::MrFcMnt => &[reg::MR_FC_MNT],
            EngineParameter::WasteGateSolenoid => &[reg::WASTE_GATE_SOLENOID],
            EngineParameter::TurboBoostSensor => &[reg::TURBO_BOOST_SENSOR],
            EngineParameter::EngineMount => &[reg::ENGINE_MOUNT],
            EngineParameter::PositionCounter => &[reg::POSITION_COUNTER],
            EngineParameter::PurgeControlValve => &[reg::PURGE_CONTROL_VALVE],
            EngineParameter::TankFuelTemperature => &[reg::TANK_FUEL_TEMP],
            EngineParameter::FpcmDrVoltage => &[reg::FPCM_DR_VOLTAGE],
            EngineParameter::FuelGaugeVoltage => &[reg::FUEL_GAUGE_VOLTAGE],
            EngineParameter::DigitalBitRegister1 => &[reg::DIGITAL_BIT_REGISTER1],
            EngineParameter::DigitalBitRegister2 => &[reg::DIGITAL_BIT_REGISTER2],
            EngineParameter::DigitalBitRegister3 => &[reg::DIGITAL_BIT_REGISTER3],
        }
    }

    /// Decode this parameter from the front of `data`, consuming exactly as
    /// many bytes as the parameter has registers. Multi-byte values are big
    /// endian. Returns the value in the unit named by [`Self::description`].
    pub fn decode(&self, data: &mut &[u8]) -> Result<f64, ConsultError> {
        let width = self.registers().len();
        if data.len() < width {
            return Err(ConsultError::ShortFrame(format!(
                "{} needs {} byte(s), frame has {}",
                self.id(),
                width,
                data.len()
            )));
        }
        let (bytes, rest) = data.split_at(width);
        *data = rest;

        let value = match self {
            EngineParameter::EngineRpm => word(bytes[0], bytes[1]) * 12.5,
            EngineParameter::LhMafVoltage | EngineParameter::RhMafVoltage => {
                word(bytes[0], bytes[1]) * 5.0 * 0.001
            }
            EngineParameter::CoolantTemperature
            | EngineParameter::FuelTemperature
            | EngineParameter::IntakeAirTemperature
            | EngineParameter::TankFuelTemperature => f64::from(bytes[0]) - 50.0,
            EngineParameter::LhO2SensorVoltage | EngineParameter::RhO2SensorVoltage => {
                f64::from(bytes[0]) * 10.0 * 0.001
            }
            EngineParameter::VehicleSpeed => f64::from(bytes[0]) * 2.0,
            EngineParameter::BatteryVoltage => f64::from(bytes[0]) * 80.0 * 0.001,
            EngineParameter::ThrottlePosition | EngineParameter::ExhaustGasTemperature => {
                f64::from(bytes[0]) * 20.0 * 0.001
            }
            EngineParameter::LhInjectionTiming | EngineParameter::RhInjectionTiming => {
                word(bytes[0], bytes[1]) * 0.01 * 0.001
            }
            EngineParameter::IgnitionTiming => 110.0 - f64::from(bytes[0]),
            EngineParameter::AacValve => f64::from(bytes[0]) / 2.0,
            EngineParameter::LhAirFuelAlpha
            | EngineParameter::RhAirFuelAlpha
            | EngineParameter::LhAirFuelAlphaSelfLearn
            | EngineParameter::RhAirFuelAlphaSelfLearn
            | EngineParameter::WasteGateSolenoid
            | EngineParameter::MrFcMnt => f64::from(bytes[0]),
            // The x20 scaling is approximate. It matches the other
            // single-byte mV registers but has not been confirmed.
            EngineParameter::TurboBoostSensor
            | EngineParameter::FpcmDrVoltage
            | EngineParameter::FuelGaugeVoltage => f64::from(bytes[0]) * 20.0 * 0.001,
            EngineParameter::EngineMount
            | EngineParameter::PositionCounter
            | EngineParameter::PurgeControlValve
            | EngineParameter::DigitalBitRegister1
            | EngineParameter::DigitalBitRegister2
            | EngineParameter::DigitalBitRegister3 => f64::from(bytes[0]),
        };
        Ok(value)
    }

    /// Stable lowercase identifier, used as the JSON key for this parameter.
    pub fn id(&self) -> &'static str {
        match self {
            EngineParameter::EngineRpm => "engine_speed_rpm",
            EngineParameter::LhMafVoltage => "lh_maf_v",
            EngineParameter::RhMafVoltage => "rh_maf_v",
            EngineParameter::CoolantTemperature => "coolant_temp_c",
            EngineParameter::LhO2SensorVoltage => "lh_o2_v",
            EngineParameter::RhO2SensorVoltage => "rh_o2_v",
            EngineParameter::VehicleSpeed => "vehicle_speed_kmph",
            EngineParameter::BatteryVoltage => "battery_v",
            EngineParameter::ThrottlePosition => "throttle_position_v",
            EngineParameter::FuelTemperature => "fuel_temp_c",
            EngineParameter::IntakeAirTemperature => "intake_air_temp_c",
            EngineParameter::ExhaustGasTemperature => "exhaust_gas_temp_v",
            EngineParameter::LhInjectionTiming => "lh_injection_timing_s",
            EngineParameter::RhInjectionTiming => "rh_injection_timing_s",
            EngineParameter::IgnitionTiming => "ignition_timing_deg_btdc",
            EngineParameter::AacValve => "aac_valve_pct",
            EngineParameter::LhAirFuelAlpha => "lh_af_alpha_pct",
            EngineParameter::RhAirFuelAlpha => "rh_af_alpha_pct",
            EngineParameter::LhAirFuelAlphaSelfLearn => "lh_af_alpha_selflearn_pct",
            EngineParameter::RhAirFuelAlphaSelfLearn => "rh_af_alpha_selflearn_pct",
            EngineParameter::MrFcMnt => "mr_fc_mnt",
            EngineParameter::WasteGateSolenoid => "waste_gate_solenoid_pct",
            EngineParameter::TurboBoostSensor => "turbo_boost_v",
            EngineParameter::EngineMount => "engine_mount",
            EngineParameter::PositionCounter => "position_counter",
            EngineParameter::PurgeControlValve => "purge_control_valve_step",
            EngineParameter::TankFuelTemperature => "tank_fuel_temp_c",
            EngineParameter::FpcmDrVoltage => "fpcm_dr_v",
            EngineParameter::FuelGaugeVoltage => "fuel_gauge_v",
            EngineParameter::DigitalBitRegister1 => "digital_bit_register1",
            EngineParameter::DigitalBitRegister2 => "digital_bit_register2",
            EngineParameter::DigitalBitRegister3 => "digital_bit_register3",
        }
    }

    /// Look a parameter up by its stable identifier.
    pub fn from_id(id: &str) -> Result<EngineParameter, ConsultError> {
        EngineParameter::ALL
            .into_iter()
            .find(|param| param.id() == id)
            .ok_or_else(|| ConsultError::UnknownParameter(id.to_string()))
    }

    /// Short human-readable name, including the unit.
    pub fn name(&self) -> &'static str {
        match self {
            EngineParameter::EngineRpm => "Engine speed (RPM)",
            EngineParameter::LhMafVoltage => "Mass Air Flow meter voltage (V)",
            EngineParameter::RhMafVoltage => "Mass Air Flow meter voltage (right-hand bank) (V)",
            EngineParameter::CoolantTemperature => "Engine coolant temperature (deg C)",
            EngineParameter::LhO2SensorVoltage => "O2 Sensor voltage (V)",
            EngineParameter::RhO2SensorVoltage => "O2 Sensor voltage (right-hand bank) (V)",
            EngineParameter::VehicleSpeed => "Vehicle speed (km/h)",
            EngineParameter::BatteryVoltage => "Battery voltage (V)",
            EngineParameter::ThrottlePosition => "Throttle Position Sensor (V)",
            EngineParameter::FuelTemperature => "Fuel temperature (deg C)",
            EngineParameter::IntakeAirTemperature => "Intake air temperature (deg C)",
            EngineParameter::ExhaustGasTemperature => "Exhaust gas temperature voltage (V)",
            EngineParameter::LhInjectionTiming => "Injection timing (S)",
            EngineParameter::RhInjectionTiming => "Injection timing (right-hand bank) (S)",
            EngineParameter::IgnitionTiming => "Ignition timing (deg BTDC)",
            EngineParameter::AacValve => "Idle air control valve (%)",
            EngineParameter::LhAirFuelAlpha => "Air/Fuel alpha (%)",
            EngineParameter::RhAirFuelAlpha => "Air/Fuel alpha (right-hand bank) (%)",
            EngineParameter::LhAirFuelAlphaSelfLearn => "Air/Fuel alpha (self learn) (%)",
            EngineParameter::RhAirFuelAlphaSelfLearn => {
                "Air/Fuel alpha (right-hand bank) (self learn) (%)"
            }
            EngineParameter::MrFcMnt => "Air/Fuel mixture ratio feedback control (rich/lean)",
            EngineParameter::WasteGateSolenoid => "Waste gate solenoid (%)",
            EngineParameter::TurboBoostSensor => "Turbo boost sensor (V)",
            EngineParameter::EngineMount => "Engine mount (on/off)",
            EngineParameter::PositionCounter => "Position Counter (count)",
            EngineParameter::PurgeControlValve => "EVAP Purge Volume Control Valve (step)",
            EngineParameter::TankFuelTemperature => "Tank fuel temperature (deg C)",
            EngineParameter::FpcmDrVoltage => "Fuel Pump Control Module",
            EngineParameter::FuelGaugeVoltage => "Fuel gauge voltage (V)",
            EngineParameter::DigitalBitRegister1 => "Digital Bit Register 1",
            EngineParameter::DigitalBitRegister2 => "Digital Bit Register 2",
            EngineParameter::DigitalBitRegister3 => "Digital Bit Register 3",
        }
    }

    /// Longer description of the signal, where one is known.
    pub fn description(&self) -> Option<&'static str> {
        match self {
            EngineParameter::EngineRpm => Some(
                "The engine speed computed from the REF signal (180 degree signal) of the \
                 camshaft position sensor.",
            ),
            EngineParameter::LhMafVoltage => {
                Some("The signal voltage of the mass air flow sensor.")
            }
            EngineParameter::RhMafVoltage => {
                Some("The signal voltage of the right-hand mass air flow sensor.")
            }
            EngineParameter::CoolantTemperature => {
                Some("The temperature of the engine coolant.")
            }
            EngineParameter::LhO2SensorVoltage => {
                Some("The signal voltage of the heated oxygen sensor 1 (front).")
            }
            EngineParameter::RhO2SensorVoltage => {
                Some("The signal voltage of the right-hand heated oxygen sensor 1 (front).")
            }
            EngineParameter::VehicleSpeed => Some("The vehicle speed"),
            EngineParameter::BatteryVoltage => Some("The power supply voltage of the ECM."),
            EngineParameter::ThrottlePosition => {
                Some("The signal voltage of the throttle position sensor.")
            }
            EngineParameter::FuelTemperature => {
                Some("The temperature of the fuel in the fuel rail.")
            }
            EngineParameter::IntakeAirTemperature => Some("The temperature of the intake air."),
            EngineParameter::ExhaustGasTemperature => {
                Some("The signal voltage of the exhaust gas temperature sensor.")
            }
            EngineParameter::LhInjectionTiming => {
                Some("The actual fuel injection pulse width, compensated by the ECM.")
            }
            EngineParameter::RhInjectionTiming => Some(
                "The actual fuel injection pulse width of the right-hand injectors, \
                 compensated by the ECM.",
            ),
            EngineParameter::IgnitionTiming => Some("The ignition timing."),
            EngineParameter::AacValve => Some("The IACV-AAC valve control value signal."),
            EngineParameter::LhAirFuelAlpha => Some(
                "The mean value of the air-fuel ratio feedback correction factor per cycle.",
            ),
            EngineParameter::RhAirFuelAlpha => Some(
                "The mean value of the air-fuel ratio feedback correction factor per cycle \
                 for the right-hand cylinder bank.",
            ),
            EngineParameter::LhAirFuelAlphaSelfLearn => Some(
                "The mean value of the air-fuel ratio feedback correction factor per cycle, \
                 as used for the air-fuel ratio learning control.",
            ),
            EngineParameter::RhAirFuelAlphaSelfLearn => Some(
                "The mean value of the air-fuel ratio feedback correction factor per cycle, \
                 as used for the air-fuel ratio learning control for the right-hand cylinder \
                 bank.",
            ),
            EngineParameter::MrFcMnt => Some(
                "The front heated oxygen sensor signal during air-fuel ratio feedback \
                 control. May be 'RICH' or 'LEAN'. 'RICH' means the mixture became rich, and \
                 control is being affected towards a leaner mixture. 'LEAN' means the mixture \
                 became lean, and control is being affected towards a rich mixture.",
            ),
            EngineParameter::WasteGateSolenoid => {
                Some("The wastegate valve control solenoid signal.")
            }
            EngineParameter::TankFuelTemperature => {
                Some("The temperature of the fuel in the fuel tank.")
            }
            EngineParameter::FuelGaugeVoltage => Some("The signal voltage of the fuel gauge."),
            EngineParameter::TurboBoostSensor
            | EngineParameter::EngineMount
            | EngineParameter::PositionCounter
            | EngineParameter::PurgeControlValve
            | EngineParameter::FpcmDrVoltage
            | EngineParameter::DigitalBitRegister1
            | EngineParameter::DigitalBitRegister2
            | EngineParameter::DigitalBitRegister3 => None,
        }
    }
}
