use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Sensors the brick can read through `opINPUT_DEVICE READY_SI`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorKind {
    Touch,
    ColorReflect,
    ColorAmbient,
    Color,
    Infrared,
    Ultrasonic,
    Gyro,
    NxtTouch,
    NxtLight,
    NxtSound,
    NxtUltrasonic,
    NxtTemperature,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown sensor kind: {0:?}")]
pub struct UnknownSensor(pub String);

impl SensorKind {
    /// Firmware device type and mode.
    pub fn type_mode(self) -> (u8, u8) {
        match self {
            SensorKind::NxtTouch => (1, 0),
            SensorKind::NxtLight => (2, 0),
            SensorKind::NxtSound => (3, 0),
            SensorKind::NxtUltrasonic => (5, 0),
            SensorKind::NxtTemperature => (6, 0),
            SensorKind::Touch => (16, 0),
            SensorKind::ColorReflect => (29, 0),
            SensorKind::ColorAmbient => (29, 1),
            SensorKind::Color => (29, 2),
            SensorKind::Ultrasonic => (30, 0),
            SensorKind::Gyro => (32, 0),
            SensorKind::Infrared => (33, 0),
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            SensorKind::Touch => "touch",
            SensorKind::ColorReflect => "color-reflect",
            SensorKind::ColorAmbient => "color-ambient",
            SensorKind::Color => "color",
            SensorKind::Infrared => "infrared",
            SensorKind::Ultrasonic => "ultrasonic",
            SensorKind::Gyro => "gyro",
            SensorKind::NxtTouch => "nxt-touch",
            SensorKind::NxtLight => "nxt-light",
            SensorKind::NxtSound => "nxt-sound",
            SensorKind::NxtUltrasonic => "nxt-ultrasonic",
            SensorKind::NxtTemperature => "nxt-temperature",
        }
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SensorKind {
    type Err = UnknownSensor;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "touch" => Ok(SensorKind::Touch),
            "color-reflect" => Ok(SensorKind::ColorReflect),
            "color-ambient" => Ok(SensorKind::ColorAmbient),
            "color" => Ok(SensorKind::Color),
            "infrared" | "ir" => Ok(SensorKind::Infrared),
            "ultrasonic" => Ok(SensorKind::Ultrasonic),
            "gyro" => Ok(SensorKind::Gyro),
            "nxt-touch" => Ok(SensorKind::NxtTouch),
            "nxt-light" => Ok(SensorKind::NxtLight),
            "nxt-sound" => Ok(SensorKind::NxtSound),
            "nxt-ultrasonic" => Ok(SensorKind::NxtUltrasonic),
            "nxt-temperature" => Ok(SensorKind::NxtTemperature),
            _ => Err(UnknownSensor(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_resolve_once() {
        assert_eq!("touch".parse(), Ok(SensorKind::Touch));
        assert_eq!("COLOR_AMBIENT".parse(), Ok(SensorKind::ColorAmbient));
        assert_eq!("ir".parse(), Ok(SensorKind::Infrared));
        assert_eq!("nxt-temperature".parse(), Ok(SensorKind::NxtTemperature));
    }

    #[test]
    fn display_parses_back() {
        for k in [SensorKind::Gyro, SensorKind::NxtLight, SensorKind::ColorReflect] {
            assert_eq!(k.to_string().parse::<SensorKind>(), Ok(k));
        }
    }

    #[test]
    fn unknown_names_are_rejected() {
        assert!("".parse::<SensorKind>().is_err());
        assert_eq!(
            "notExistingSensor O_O".parse::<SensorKind>(),
            Err(UnknownSensor("notExistingSensor O_O".into()))
        );
    }

    #[test]
    fn color_modes_share_a_type() {
        assert_eq!(SensorKind::ColorReflect.type_mode(), (29, 0));
        assert_eq!(SensorKind::ColorAmbient.type_mode(), (29, 1));
        assert_eq!(SensorKind::Color.type_mode(), (29, 2));
    }
}
