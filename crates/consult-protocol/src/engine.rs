//! CONSULT Protocol Engine
//!
//! Drives the client side of the CONSULT state machine over a
//! [`ByteTransport`]: handshake, command echo verification, go-ahead,
//! framed streaming and the halt sequence.

use tracing::{debug, info, warn};

use crate::command;
use crate::error::ConsultError;
use crate::params::EngineParameter;
use crate::response::{EcuMetadata, EngineParameters, FaultCodes};
use crate::transport::ByteTransport;

/// Upper bound on stale bytes discarded while waiting for the handshake
/// acknowledgement. The ECM may be mid-stream when we connect, so some
/// garbage is expected, but a stream that never acknowledges is a fault.
const MAX_SYNC_DISCARD: usize = 4096;

/// Compute the echo the ECM sends for `request`.
///
/// The ECM echoes one byte per request byte: command bytes come back
/// complemented, data bytes verbatim. `command_width` consecutive bytes are
/// treated as command bytes, then `data_width` as data bytes, alternating
/// for the full request. `data_width` of `None` means the whole remainder
/// after the first command run is data.
fn expected_echo(request: &[u8], command_width: usize, data_width: Option<usize>) -> Vec<u8> {
    let data_width = data_width.unwrap_or_else(|| request.len().saturating_sub(command_width));
    let mut echo = request.to_vec();
    let mut is_command = command_width > 0;
    let mut run = 0usize;
    for byte in &mut echo {
        if is_command {
            *byte = !*byte;
            run += 1;
            if run >= command_width {
                is_command = data_width == 0;
                run = 0;
            }
        } else {
            run += 1;
            if run >= data_width {
                is_command = command_width > 0;
                run = 0;
            }
        }
    }
    echo
}

/// A connected CONSULT client.
///
/// Constructing the engine performs the bus handshake. The engine owns its
/// transport for its whole lifetime and releases it without any further
/// protocol bytes; halts are issued per operation, not on drop.
pub struct ConsultEngine<T: ByteTransport> {
    transport: T,
}

impl<T: ByteTransport> ConsultEngine<T> {
    /// Connect to the ECM: send the initialisation sequence and discard
    /// stale bytes until the acknowledgement arrives.
    pub fn new(mut transport: T) -> Result<ConsultEngine<T>, ConsultError> {
        transport.write(&command::INIT)?;
        let mut discarded = 0usize;
        loop {
            if transport.read(1)?[0] == command::INIT_ACK {
                break;
            }
            discarded += 1;
            if discarded > MAX_SYNC_DISCARD {
                return Err(ConsultError::ProtocolViolation(format!(
                    "no handshake acknowledgement within {MAX_SYNC_DISCARD} bytes"
                )));
            }
        }
        if discarded > 0 {
            debug!("discarded {} stale byte(s) during handshake", discarded);
        }
        info!("ECU handshake complete");
        Ok(ConsultEngine { transport })
    }

    /// Read identifying information about the ECU.
    pub fn read_ecu_metadata(&mut self) -> Result<EcuMetadata, ConsultError> {
        self.execute(&[command::ECU_INFO], 1, None, true)?;
        let frame = self.read_frame()?;
        self.halt()?;
        EcuMetadata::from_frame(&frame)
    }

    /// Read any recently observed fault codes from the ECU.
    pub fn read_fault_codes(&mut self) -> Result<FaultCodes, ConsultError> {
        self.execute(&[command::FAULT_CODES], 1, None, true)?;
        let frame = self.read_frame()?;
        self.halt()?;
        FaultCodes::from_frame(&frame)
    }

    /// Read the current value of one or more engine parameters.
    pub fn read_engine_parameters(
        &mut self,
        params: &[EngineParameter],
    ) -> Result<EngineParameters, ConsultError> {
        let request = parameter_request(params);
        self.execute(&request, 1, Some(1), true)?;
        let frame = self.read_frame()?;
        self.halt()?;
        EngineParameters::from_frame(params, &frame)
    }

    /// Request a live stream of one or more engine parameters.
    ///
    /// The returned stream borrows this engine exclusively; no other
    /// operation can be issued until it is released. Releasing the stream
    /// halts the ECM exactly once.
    pub fn stream_engine_parameters(
        &mut self,
        params: &[EngineParameter],
    ) -> Result<ParameterStream<'_, T>, ConsultError> {
        let request = parameter_request(params);
        self.execute(&request, 1, Some(1), true)?;
        Ok(ParameterStream {
            engine: self,
            params: params.to_vec(),
            halted: false,
        })
    }

    /// Send a request, verify the echo and authorise the ECM to respond.
    ///
    /// With `verify` disabled (reserved for commands that echo in a
    /// non-standard way) the echo bytes are read and discarded instead of
    /// compared.
    fn execute(
        &mut self,
        request: &[u8],
        command_width: usize,
        data_width: Option<usize>,
        verify: bool,
    ) -> Result<(), ConsultError> {
        debug!("TX {:02x?}", request);
        self.transport.write(request)?;
        if verify {
            let expected = expected_echo(request, command_width, data_width);
            let echo = self.transport.read(expected.len())?;
            if echo != expected {
                return Err(ConsultError::ProtocolViolation(format!(
                    "echo {:02x?} did not match expected {:02x?}",
                    echo, expected
                )));
            }
        } else {
            self.transport.read(request.len())?;
        }
        self.transport.write(&[command::GO_AHEAD])?;
        Ok(())
    }

    /// Read one `FF <len> <payload>` frame and return the payload.
    fn read_frame(&mut self) -> Result<Vec<u8>, ConsultError> {
        let header = self.transport.read(2)?;
        if header[0] != command::FRAME_START {
            return Err(ConsultError::ProtocolViolation(format!(
                "frame header began with {:#04x}",
                header[0]
            )));
        }
        self.transport.read(header[1] as usize)
    }

    /// Stop the ECM streaming, draining any frames already in flight.
    ///
    /// After a halt request the ECM only ever emits further frame starts
    /// and the stop acknowledgement, so anything else is a violation.
    fn halt(&mut self) -> Result<(), ConsultError> {
        self.transport.write(&[command::HALT])?;
        loop {
            match self.transport.read(1)?[0] {
                command::HALT_ACK => return Ok(()),
                command::FRAME_START => {
                    let len = self.transport.read(1)?[0] as usize;
                    self.transport.read(len)?;
                }
                other => {
                    return Err(ConsultError::ProtocolViolation(format!(
                        "unexpected byte {:#04x} while halting",
                        other
                    )))
                }
            }
        }
    }
}

/// Build the wire request for a parameter list: one read-register command
/// byte per register id, concatenated in request order.
fn parameter_request(params: &[EngineParameter]) -> Vec<u8> {
    let mut request = Vec::new();
    for param in params {
        for &register in param.registers() {
            request.push(command::READ_REGISTER);
            request.push(register);
        }
    }
    request
}

/// A live engine parameter stream.
///
/// Owns the engine exclusively for its lifetime. Each [`next_frame`] call
/// blocks for one frame. Dropping the stream halts the ECM, swallowing any
/// failure; use [`stop`] to observe halt errors.
///
/// [`next_frame`]: ParameterStream::next_frame
/// [`stop`]: ParameterStream::stop
pub struct ParameterStream<'a, T: ByteTransport> {
    engine: &'a mut ConsultEngine<T>,
    params: Vec<EngineParameter>,
    halted: bool,
}

impl<T: ByteTransport> ParameterStream<'_, T> {
    /// Block until the next frame arrives and decode it.
    pub fn next_frame(&mut self) -> Result<EngineParameters, ConsultError> {
        let frame = self.engine.read_frame()?;
        EngineParameters::from_frame(&self.params, &frame)
    }

    /// Halt the stream, surfacing any protocol error.
    pub fn stop(mut self) -> Result<(), ConsultError> {
        self.halted = true;
        self.engine.halt()
    }
}

impl<T: ByteTransport> Drop for ParameterStream<'_, T> {
    fn drop(&mut self) {
        if !self.halted {
            if let Err(error) = self.engine.halt() {
                warn!("failed to halt parameter stream: {}", error);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::RecordingTransport;
    use crate::replay::ReplayTransport;

    fn replay(log: &str) -> ReplayTransport {
        ReplayTransport::new(log.as_bytes(), false).unwrap()
    }

    #[test]
    fn test_expected_echo_single_command_byte() {
        assert_eq!(expected_echo(&[0xd0], 1, None), vec![0x2f]);
    }

    #[test]
    fn test_expected_echo_command_then_data() {
        assert_eq!(
            expected_echo(&[0xd0, 0x01, 0x02], 1, None),
            vec![0x2f, 0x01, 0x02]
        );
    }

    #[test]
    fn test_expected_echo_alternating() {
        assert_eq!(
            expected_echo(&[0x5a, 0x00, 0x5a, 0x01, 0x5a, 0x0b, 0x5a, 0x0c], 1, Some(1)),
            vec![0xa5, 0x00, 0xa5, 0x01, 0xa5, 0x0b, 0xa5, 0x0c]
        );
    }

    #[test]
    fn test_expected_echo_wide_command_run() {
        assert_eq!(
            expected_echo(&[0x01, 0x02, 0x03, 0x04], 2, Some(1)),
            vec![!0x01, !0x02, 0x03, !0x04]
        );
    }

    #[test]
    fn test_parameter_request_interleaves_read_register() {
        let request = parameter_request(&[
            EngineParameter::EngineRpm,
            EngineParameter::VehicleSpeed,
            EngineParameter::BatteryVoltage,
        ]);
        assert_eq!(
            request,
            vec![0x5a, 0x00, 0x5a, 0x01, 0x5a, 0x0b, 0x5a, 0x0c]
        );
    }

    #[test]
    fn test_handshake() {
        ConsultEngine::new(replay("W ffffef\nR 10\n")).unwrap();
    }

    #[test]
    fn test_handshake_discards_garbage() {
        ConsultEngine::new(replay("W ffffef\nR 000010\n")).unwrap();
    }

    #[test]
    fn test_handshake_never_acknowledged() {
        let mut log = String::from("W ffffef\nR ");
        for _ in 0..(MAX_SYNC_DISCARD + 2) {
            log.push_str("00");
        }
        log.push('\n');
        assert!(matches!(
            ConsultEngine::new(replay(&log)),
            Err(ConsultError::ProtocolViolation(_))
        ));
    }

    #[test]
    fn test_read_ecu_metadata() {
        let log = "W ffffef\nR 10\nW d0\nR 2f\nW f0\n\
                   R ff16002114802000003f8080e2200000\
                   28ffff4141353032\nW 30\nR cf\n";
        let mut engine = ConsultEngine::new(replay(log)).unwrap();
        let metadata = engine.read_ecu_metadata().unwrap();
        assert_eq!(metadata.part_number, "1480 23710-353032");
    }

    #[test]
    fn test_read_ecu_metadata_bad_echo() {
        let log = "W ffffef\nR 10\nW d0\nR 2e\n";
        let mut engine = ConsultEngine::new(replay(log)).unwrap();
        assert!(matches!(
            engine.read_ecu_metadata(),
            Err(ConsultError::ProtocolViolation(_))
        ));
    }

    #[test]
    fn test_read_fault_codes_single() {
        let log = "W ffffef\nR 10\nW d1\nR 2e\nW f0\nR ff02330b\nW 30\nR cf\n";
        let mut engine = ConsultEngine::new(replay(log)).unwrap();
        let codes = engine.read_fault_codes().unwrap();
        assert_eq!(codes.codes.len(), 1);
        assert_eq!(codes.codes[0].code, crate::FaultCode::FuelInjector);
        assert_eq!(codes.codes[0].starts_since_observed, 11);
    }

    #[test]
    fn test_read_fault_codes_double() {
        let log = "W ffffef\nR 10\nW d1\nR 2e\nW f0\nR ff04330b6942\nW 30\nR cf\n";
        let mut engine = ConsultEngine::new(replay(log)).unwrap();
        let codes = engine.read_fault_codes().unwrap();
        assert_eq!(codes.codes.len(), 2);
        assert_eq!(
            codes.codes[1].code,
            crate::FaultCode::ExhaustGasRecirculationValve
        );
        assert_eq!(codes.codes[1].starts_since_observed, 66);
    }

    #[test]
    fn test_read_engine_parameters_multiple() {
        let log = "W ffffef\nR 10\nW 5a005a015a0b5a0c\nR a500a501a50ba50c\nW f0\n\
                   R ff04007500b4\nW 30\nR cf\n";
        let mut engine = ConsultEngine::new(replay(log)).unwrap();
        let values = engine
            .read_engine_parameters(&[
                EngineParameter::EngineRpm,
                EngineParameter::VehicleSpeed,
                EngineParameter::BatteryVoltage,
            ])
            .unwrap();
        assert_eq!(values.get(EngineParameter::EngineRpm), Some(1462.5));
        assert_eq!(values.get(EngineParameter::VehicleSpeed), Some(0.0));
        assert_eq!(values.get(EngineParameter::BatteryVoltage), Some(14.4));
    }

    #[test]
    fn test_execute_without_verification_discards_echo() {
        // The echo byte does not match the request, but with verification
        // disabled it is read and thrown away.
        let log = "W ffffef\nR 10\nW d0\nR 00\nW f0\n";
        let mut engine = ConsultEngine::new(replay(log)).unwrap();
        engine.execute(&[0xd0], 1, None, false).unwrap();
    }

    #[test]
    fn test_bad_frame_header() {
        let log = "W ffffef\nR 10\nW d0\nR 2f\nW f0\nR 0016\n";
        let mut engine = ConsultEngine::new(replay(log)).unwrap();
        assert!(matches!(
            engine.read_ecu_metadata(),
            Err(ConsultError::ProtocolViolation(_))
        ));
    }

    #[test]
    fn test_halt_drains_inflight_frames() {
        let log = "W ffffef\nR 10\nW d1\nR 2e\nW f0\nR ff02330b\nW 30\n\
                   R ff02331f\nR cf\n";
        let mut engine = ConsultEngine::new(replay(log)).unwrap();
        let codes = engine.read_fault_codes().unwrap();
        assert_eq!(codes.codes.len(), 1);
    }

    #[test]
    fn test_halt_unexpected_byte() {
        let log = "W ffffef\nR 10\nW d1\nR 2e\nW f0\nR ff02330b\nW 30\nR ab\n";
        let mut engine = ConsultEngine::new(replay(log)).unwrap();
        assert!(matches!(
            engine.read_fault_codes(),
            Err(ConsultError::ProtocolViolation(_))
        ));
    }

    #[test]
    fn test_stream_engine_parameters() {
        let log = "W ffffef\nR 10\nW 5a005a01\nR a500a501\nW f0\n\
                   R ff020075\nR ff020085\nR ff020095\nW 30\nR cf\n";
        let mut engine = ConsultEngine::new(replay(log)).unwrap();
        let mut stream = engine
            .stream_engine_parameters(&[EngineParameter::EngineRpm])
            .unwrap();

        let expectations = [1462.5, 1662.5, 1862.5];
        for expected in expectations {
            let values = stream.next_frame().unwrap();
            assert_eq!(values.get(EngineParameter::EngineRpm), Some(expected));
        }
        stream.stop().unwrap();
    }

    #[test]
    fn test_stream_halts_on_drop() {
        // Only one frame is consumed. Dropping the stream must halt, which
        // skips the unread frames and consumes the stop acknowledgement.
        let log = "W ffffef\nR 10\nW 5a005a01\nR a500a501\nW f0\n\
                   R ff020075\nR ff020085\nW 30\nR cf\n";
        let mut engine = ConsultEngine::new(replay(log)).unwrap();
        {
            let mut stream = engine
                .stream_engine_parameters(&[EngineParameter::EngineRpm])
                .unwrap();
            stream.next_frame().unwrap();
        }
        // The log is fully consumed: any further exchange fails.
        assert!(engine.read_fault_codes().is_err());
    }

    #[test]
    fn test_record_replay_round_trip() {
        let golden = "W ffffef\nR 10\nW d0\nR 2f\nW f0\n\
                      R ff16002114802000003f8080e2200000\
                      28ffff4141353032\nW 30\nR cf\n";

        let mut recorded = Vec::new();
        {
            let inner = replay(golden);
            let recorder = RecordingTransport::new(inner, &mut recorded);
            let mut engine = ConsultEngine::new(recorder).unwrap();
            let metadata = engine.read_ecu_metadata().unwrap();
            assert_eq!(metadata.part_number, "1480 23710-353032");
        }
        assert_eq!(String::from_utf8(recorded).unwrap(), golden);
    }
}
