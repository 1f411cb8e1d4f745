use crate::catalog::DataType;

/// Scale a raw ADC code into physical units.
///
/// Units depend on the configured data type: PT100/PT1000 yield °C,
/// resistance ranges yield mΩ and voltage ranges yield mV.
///
/// # Panics
///
/// Panics for [`DataType::Off`]. An off channel produces no conversions, so
/// scaling one is a programming error and must not silently pass the raw
/// code through.
pub fn scale(raw: i32, data_type: DataType) -> f64 {
    let value = raw as f64;
    match data_type {
        // °C
        DataType::Pt100 | DataType::Pt1000 => value / 1e3,
        // mOhm
        DataType::ResistanceTo375R => value / 1e3,
        DataType::ResistanceTo10K => value,
        // mV
        DataType::DifferentialTo115Mv | DataType::SingleEndedTo115Mv => value / 1e9,
        DataType::DifferentialTo2500Mv | DataType::SingleEndedTo2500Mv => value / 1e8,
        DataType::Off => panic!("scale() called for a channel that is switched off"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_rtd_to_celsius() {
        assert_eq!(scale(100_000, DataType::Pt100), 100.0);
        assert_eq!(scale(-12_345, DataType::Pt1000), -12.345);
    }

    #[test]
    fn test_scale_resistance_to_milliohm() {
        assert_eq!(scale(375_000, DataType::ResistanceTo375R), 375.0);
        // The 10k range is already reported in mOhm.
        assert_eq!(scale(10_000, DataType::ResistanceTo10K), 10_000.0);
    }

    #[test]
    fn test_scale_voltage_to_millivolt() {
        assert_eq!(scale(250_000_000, DataType::DifferentialTo2500Mv), 2.5);
        assert_eq!(scale(250_000_000, DataType::SingleEndedTo2500Mv), 2.5);
        assert_eq!(scale(115_000_000, DataType::DifferentialTo115Mv), 0.115);
        assert_eq!(scale(115_000_000, DataType::SingleEndedTo115Mv), 0.115);
    }

    #[test]
    fn test_scale_is_linear() {
        let a = scale(1_000, DataType::Pt100);
        let b = scale(2_000, DataType::Pt100);
        assert_eq!(b, 2.0 * a);
    }

    #[test]
    #[should_panic]
    fn test_scale_off_channel_panics() {
        let _ = scale(0, DataType::Off);
    }
}
