//! Fault Code Coding
//!
//! The closed set of diagnostic conditions the ECM can report, keyed by the
//! 8-bit id it transmits on the wire. For engines with two cylinder banks,
//! the unqualified codes refer to the left-hand bank.

use serde::{Deserialize, Serialize};

use crate::error::ConsultError;

/// A fault condition reported by the ECM. Discriminants are the ids the ECM
/// sends on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum FaultCode {
    CrankshaftPositionSensorCircuit = 11,
    MassAirFlowSensor = 12,
    EngineCoolantSensor = 13,
    VehicleSpeedSensor = 14,
    MotorThrottleSwitch = 16,
    AbsTcsControlUnit = 17,
    IgnitionSignal = 21,
    FuelPump = 22,
    IdleSwitch = 23,
    ThrottleValveSwitch = 24,
    IdleSpeedControl = 25,
    TurboPressureSensor = 26,
    CoolantOverheat = 28,
    EcmFault = 31,
    ExhaustGasRecirculation = 32,
    HeatedOxygenSensor = 33,
    KnockSensor = 34,
    ExhaustGasTemperatureSensor = 35,
    EgrControlValve = 36,
    EngineKnock = 37,
    ClosedLoopRh = 38,
    IntakeAirTemperatureSensor = 41,
    FuelTemperatureSensor = 42,
    ThrottlePositionSensor = 43,
    AbsTcsCircuit = 44,
    InjectorLeak = 45,
    ThrottleMotorSensor = 46,
    CrankshaftPositionSensor = 47,
    FuelInjector = 51,
    OxygenSensor = 53,
    AutomaticTransmission = 54,
    NoMalfunction = 55,
    Cylinder6Misfire = 63,
    Cylinder5Misfire = 64,
    Cylinder4Misfire = 65,
    Cylinder3Misfire = 66,
    Cylinder2Misfire = 67,
    Cylinder1Misfire = 68,
    RandomMisfire = 71,
    ThreeWayCatalystRh = 72,
    FuelInjectorRh = 76,
    HeatedOxygenSensorRear = 77,
    CrankshaftPositionSensorRh = 82,
    AutomaticTransmissionDiagnostic = 84,
    CanisterControlValve = 87,
    HeatedOxygenSensorRh = 91,
    TorqueConverterValve = 94,
    CrankPositionCog = 95,
    EngineCoolantSensorRh = 98,
    HeatedOxygenSensorRh2 = 101,
    ParkPositionSwitch = 103,
    ExhaustGasRecirculationValve = 105,
    CanisterPurgeControlValve = 108,
    InhibitorSwitch = 111,
    AtSpeedSensor = 112,
    At1stSignal = 113,
    At2ndSignal = 114,
    At3rdSignal = 115,
    At4thSignal = 116,
    AtShiftValveA = 118,
    AtShiftValveB = 121,
    AtOverrunClutchValve = 123,
    AtTorqueConverterValve = 124,
    AtLinePressure = 125,
    AtThrottlePositionSensor = 126,
    AtEngineSpeed = 127,
    AtTemperatureSensor = 128,
}

impl FaultCode {
    /// Every defined fault code, in id order.
    pub const ALL: [FaultCode; 67] = [
        FaultCode::CrankshaftPositionSensorCircuit,
        FaultCode::MassAirFlowSensor,
        FaultCode::EngineCoolantSensor,
        FaultCode::VehicleSpeedSensor,
        FaultCode::MotorThrottleSwitch,
        FaultCode::AbsTcsControlUnit,
        FaultCode::IgnitionSignal,
        FaultCode::FuelPump,
        FaultCode::IdleSwitch,
        FaultCode::ThrottleValveSwitch,
        FaultCode::IdleSpeedControl,
        FaultCode::TurboPressureSensor,
        FaultCode::CoolantOverheat,
        FaultCode::EcmFault,
        FaultCode::ExhaustGasRecirculation,
        FaultCode::HeatedOxygenSensor,
        FaultCode::KnockSensor,
        FaultCode::ExhaustGasTemperatureSensor,
        FaultCode::EgrControlValve,
        FaultCode::EngineKnock,
        FaultCode::ClosedLoopRh,
        FaultCode::IntakeAirTemperatureSensor,
        FaultCode::FuelTemperatureSensor,
        FaultCode::ThrottlePositionSensor,
        FaultCode::AbsTcsCircuit,
        FaultCode::InjectorLeak,
        FaultCode::ThrottleMotorSensor,
        FaultCode::CrankshaftPositionSensor,
        FaultCode::FuelInjector,
        FaultCode::OxygenSensor,
        FaultCode::AutomaticTransmission,
        FaultCode::NoMalfunction,
        FaultCode::Cylinder6Misfire,
        FaultCode::Cylinder5Misfire,
        FaultCode::Cylinder4Misfire,
        FaultCode::Cylinder3Misfire,
        FaultCode::Cylinder2Misfire,
        FaultCode::Cylinder1Misfire,
        FaultCode::RandomMisfire,
        FaultCode::ThreeWayCatalystRh,
        FaultCode::FuelInjectorRh,
        FaultCode::HeatedOxygenSensorRear,
        FaultCode::CrankshaftPositionSensorRh,
        FaultCode::AutomaticTransmissionDiagnostic,
        FaultCode::CanisterControlValve,
        FaultCode::HeatedOxygenSensorRh,
        FaultCode::TorqueConverterValve,
        FaultCode::CrankPositionCog,
        FaultCode::EngineCoolantSensorRh,
        FaultCode::HeatedOxygenSensorRh2,
        FaultCode::ParkPositionSwitch,
        FaultCode::ExhaustGasRecirculationValve,
        FaultCode::CanisterPurgeControlValve,
        FaultCode::InhibitorSwitch,
        FaultCode::AtSpeedSensor,
        FaultCode::At1stSignal,
        FaultCode::At2ndSignal,
        FaultCode::At3rdSignal,
        FaultCode::At4thSignal,
        FaultCode::AtShiftValveA,
        FaultCode::AtShiftValveB,
        FaultCode::AtOverrunClutchValve,
        FaultCode::AtTorqueConverterValve,
        FaultCode::AtLinePressure,
        FaultCode::AtThrottlePositionSensor,
        FaultCode::AtEngineSpeed,
        FaultCode::AtTemperatureSensor,
    ];

    /// Convert a raw id, as supplied by the ECM, into a fault code.
    pub fn from_id(id: u8) -> Result<FaultCode, ConsultError> {
        FaultCode::ALL
            .into_iter()
            .find(|code| code.id() == id)
            .ok_or(ConsultError::UnknownFaultCode(id))
    }

    /// The id the ECM uses for this fault code.
    pub fn id(&self) -> u8 {
        *self as u8
    }

    /// Short human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            FaultCode::CrankshaftPositionSensorCircuit => {
                "Crankshaft position sensor signal circuit"
            }
            FaultCode::MassAirFlowSensor => "Mass air flow sensor signal circuit",
            FaultCode::EngineCoolantSensor => {
                "Engine coolant temperature sensor signal circuit"
            }
            FaultCode::VehicleSpeedSensor => "Vehicle speed sensor signal circuit",
            FaultCode::MotorThrottleSwitch => "Motor throttle switch signal circuit [RB25DET]",
            FaultCode::AbsTcsControlUnit => "ABS-TCS control unit circuit [RB25DET]",
            FaultCode::IgnitionSignal => "Ignition signal circuit",
            FaultCode::FuelPump => "Fuel pump",
            FaultCode::IdleSwitch => "Idle switch",
            FaultCode::ThrottleValveSwitch => "Throttle Valve Switch",
            FaultCode::IdleSpeedControl => "Idle Speed Control Valve",
            FaultCode::TurboPressureSensor => "Turbo pressure sensor signal circuit [RB25DET]",
            FaultCode::CoolantOverheat => "Overheat",
            FaultCode::EcmFault => "ECM",
            FaultCode::ExhaustGasRecirculation => "EGR Function",
            FaultCode::HeatedOxygenSensor => "Heated oxygen sensor signal circuit",
            FaultCode::KnockSensor => "Knock sensor signal circuit",
            FaultCode::ExhaustGasTemperatureSensor => "Exhaust Gas Temperature Sensor",
            FaultCode::EgrControlValve => "EGR Control-Back Pressure Transducer",
            FaultCode::EngineKnock => "Knock Sensor",
            FaultCode::ClosedLoopRh => "Right hand bank Closed Loop (B2)",
            FaultCode::IntakeAirTemperatureSensor => "Intake Air Temperature Sensor",
            FaultCode::FuelTemperatureSensor => "Fuel Temperature Sensor",
            FaultCode::ThrottlePositionSensor => "Throttle position sensor signal circuit",
            FaultCode::AbsTcsCircuit => "ABS-TCS communication circuit [RB25DET]",
            FaultCode::InjectorLeak => "Injector Leak",
            FaultCode::ThrottleMotorSensor => "Throttle motor sensor signal circuit [RB25DET]",
            FaultCode::CrankshaftPositionSensor => "Crankshaft Position Sensor",
            FaultCode::FuelInjector => "Injector Circuit",
            FaultCode::OxygenSensor => "Oxygen Sensor",
            FaultCode::AutomaticTransmission => "A/T communication circuit",
            FaultCode::NoMalfunction => "No malfunction",
            FaultCode::Cylinder6Misfire => "No. 6 Cylinder Misfire",
            FaultCode::Cylinder5Misfire => "No. 5 Cylinder Misfire",
            FaultCode::Cylinder4Misfire => "No. 4 Cylinder Misfire",
            FaultCode::Cylinder3Misfire => "No. 3 Cylinder Misfire",
            FaultCode::Cylinder2Misfire => "No. 2 Cylinder Misfire",
            FaultCode::Cylinder1Misfire => "No. 1 Cylinder Misfire",
            FaultCode::RandomMisfire => "Random Misfire",
            FaultCode::ThreeWayCatalystRh => "TWC Function right hand bank",
            FaultCode::FuelInjectorRh => "Fuel Injection System Function right hand bank",
            FaultCode::HeatedOxygenSensorRear => "Rear Heated Oxygen Sensor Circuit",
            FaultCode::CrankshaftPositionSensorRh => "Crankshaft Position Sensor",
            FaultCode::AutomaticTransmissionDiagnostic => {
                "Automatic Transmission Diagnostic Communication Line"
            }
            FaultCode::CanisterControlValve => "Canister Control Solenoid Valve Circuit",
            FaultCode::HeatedOxygenSensorRh => {
                "Front Heated Oxygen Sensor Heater Circuit right hand bank"
            }
            FaultCode::TorqueConverterValve => "TCC Solenoid Valve",
            FaultCode::CrankPositionCog => "Crank Position Cog",
            FaultCode::EngineCoolantSensorRh => "Engine Coolant Temperature Sensor",
            FaultCode::HeatedOxygenSensorRh2 => {
                "Front Heated Oxygen Sensor Heater Circuit right hand bank"
            }
            FaultCode::ParkPositionSwitch => "Park/Neutral Position Switch Circuit",
            FaultCode::ExhaustGasRecirculationValve => {
                "EGR and EGR Canister Control Solenoid Valve Circuit"
            }
            FaultCode::CanisterPurgeControlValve => "Canister Purge Control Valve Circuit",
            FaultCode::InhibitorSwitch => "Inhibitor Switch",
            FaultCode::AtSpeedSensor => "Automatic Transmission Speed Sensor",
            FaultCode::At1stSignal => "Automatic Transmission 1st Signal",
            FaultCode::At2ndSignal => "Automatic Transmission 2nd Signal",
            FaultCode::At3rdSignal => "Automatic Transmission 3rd Signal",
            FaultCode::At4thSignal => "Automatic Transmission 4th Signal",
            FaultCode::AtShiftValveA => "Automatic Transmission Shift Solenoid Valve A",
            FaultCode::AtShiftValveB => "Automatic Transmission Shift Solenoid Valve B",
            FaultCode::AtOverrunClutchValve => {
                "Automatic Transmission Overrun Clutch Solenoid Valve"
            }
            FaultCode::AtTorqueConverterValve => {
                "Automatic Transmission TOR Conv Solenoid Valve"
            }
            FaultCode::AtLinePressure => "Automatic Transmission Line Pressure Solenoid",
            FaultCode::AtThrottlePositionSensor => {
                "Automatic Transmission Throttle Position Sensor"
            }
            FaultCode::AtEngineSpeed => "Automatic Transmission Engine Speed Signal",
            FaultCode::AtTemperatureSensor => {
                "Automatic Transmission Fluid Temperature Sensor"
            }
        }
    }

    /// Longer description of the detection condition, where one is known.
    pub fn description(&self) -> Option<&'static str> {
        match self {
            FaultCode::CrankshaftPositionSensorCircuit => Some(
                "1-degree (POS) signal or 120-degree (REF) signal is not input for \
                 predetermined time while the engine is running. Abnormal correlation is \
                 detected between 1-degree (POS) signal and 120-degree (REF) sianal.",
            ),
            FaultCode::MassAirFlowSensor => Some(
                "Mass air flow sensor output voltage is 4.9V or greater for predetermined \
                 time when ignition switch is turned from OFF to ON, or after the engine is \
                 stalled. Mass air flow sensor output voltage is less than 0.3V for \
                 predetermined time while the engine is running.",
            ),
            FaultCode::EngineCoolantSensor => Some(
                "Engine coolant temperature sensor output voltage is approx. 4.8V or \
                 greater (open circuit) or less than 0.06V (short circuit) for \
                 predetermined time.",
            ),
            FaultCode::VehicleSpeedSensor => Some(
                "No vehicle speed signal is input for predetermined time while the vehicle \
                 is being driven after warm up.",
            ),
            FaultCode::MotorThrottleSwitch => Some(
                "Abnormal correlation is detected between input voltages from the throttle \
                 motor sensor and from the motor throttle switch for predetermined time.",
            ),
            FaultCode::AbsTcsControlUnit => Some(
                "Throttle control unit detects malfunction in the system. (Open throttle \
                 sensor harness, etc.). TCS/ABS control unit detects malfunction.",
            ),
            FaultCode::IgnitionSignal => {
                Some("No consecutive ignition signal while the engine is running.")
            }
            FaultCode::TurboPressureSensor => Some(
                "Turbo pressure sensor output voltage is approx. 4.8V or greater (open \
                 circuit) or less than 0.06V (short circuit) for predetermined time.",
            ),
            FaultCode::CoolantOverheat => Some(
                "Engine coolant temperature sensor output voltage is approx. 0.35V or less \
                 (sensor normal) for predetermined time.",
            ),
            FaultCode::HeatedOxygenSensor => Some(
                "Heated oxygen sensor output voltage is approx. 0.2V or greater and less \
                 than approx. 0.4V for predetermined time while the vehicle is being driven \
                 after warm up. Heated oxygen sensor output voltage is approx. 2V or \
                 greater for predetermined time.",
            ),
            FaultCode::KnockSensor => Some(
                "At least one knock sensor indicates the output voltage of approx. 4V or \
                 greater (open circuit) or less than approx. 1V (short circuit).",
            ),
            FaultCode::ThrottlePositionSensor => Some(
                "Throttle position sensor output voltage is approx. 4.7V or greater (open \
                 circuit) or less than 0.06V (short circuit) for predetermined time while \
                 park/neutral position switch is OFF and vehicle speed is 4 km/h or higher.",
            ),
            FaultCode::AbsTcsCircuit => Some(
                "Malfunction (open/short circuit, etc.) is detected in multiplex \
                 communication line between engine and TCS/ABS.",
            ),
            FaultCode::ThrottleMotorSensor => Some(
                "Throttle motor sensor input voltage is approx. 4.8V or greater (open \
                 circuit) or less than 0.3V (short circuit) for predetermined time.",
            ),
            FaultCode::AutomaticTransmission => Some(
                "Malfunction is detected in PA communication circuit in ECM(-TCM). [RB25DE \
                 (L/B), RB25DET]. Malfunction (open circuit, short circuit, etc.) is \
                 detected in multiplex communication line between ECM and TCM. [RB25DE].",
            ),
            FaultCode::NoMalfunction => {
                Some("No malfunction is detected in any monitored circuit.")
            }
            _ => None,
        }
    }
}
