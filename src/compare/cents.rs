/// Signed pitch distance from a reference frequency to a student frequency,
/// in cents (100 cents = one semitone, 1200 = one octave).
///
/// Formula: 1200 * log2(student / reference).
/// Positive = student is sharp (above the reference), negative = flat.
///
/// Both inputs must be strictly positive; the caller is responsible for
/// excluding unvoiced frames before getting here. `PitchSeries` guarantees
/// voiced frequencies are positive, so this never sees zero or a negative.
pub fn cents_deviation(reference_hz: f32, student_hz: f32) -> f32 {
    debug_assert!(reference_hz > 0.0 && student_hz > 0.0);
    1200.0 * (student_hz / reference_hz).log2()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_frequencies_are_zero_cents() {
        for hz in [55.0, 220.0, 440.0, 1975.5] {
            assert_eq!(cents_deviation(hz, hz), 0.0, "non-zero at {hz} Hz");
        }
    }

    #[test]
    fn octave_up_is_1200_cents() {
        for hz in [110.0, 261.6, 440.0] {
            let d = cents_deviation(hz, 2.0 * hz);
            assert!(
                (d - 1200.0).abs() < 1e-3,
                "octave above {hz} Hz gave {d} cents"
            );
        }
    }

    #[test]
    fn octave_down_is_minus_1200_cents() {
        let d = cents_deviation(440.0, 220.0);
        assert!((d + 1200.0).abs() < 1e-3);
    }

    #[test]
    fn semitone_is_100_cents() {
        // A4 (440) up to A#4 (440 * 2^(1/12))
        let sharp = 440.0 * 2.0_f32.powf(1.0 / 12.0);
        let d = cents_deviation(440.0, sharp);
        assert!((d - 100.0).abs() < 0.01, "semitone gave {d} cents");
    }

    #[test]
    fn sharp_is_positive_flat_is_negative() {
        assert!(cents_deviation(220.0, 233.0) > 0.0);
        assert!(cents_deviation(233.0, 220.0) < 0.0);
    }
}
