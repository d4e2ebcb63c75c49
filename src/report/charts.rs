use std::path::Path;

use anyhow::{Context, Result};
use plotters::coord::types::RangedCoordf32;
use plotters::prelude::*;

use crate::compare::classify::Bucket;
use crate::compare::{AlignedPair, Comparison, PitchSeries};
use crate::dsp::spectrogram::Spectrogram;

/// Chart dimensions
const WIDTH: u32 = 1400;
const PANEL_HEIGHT: u32 = 330;

/// Colors for chart lines/points
const COLOR_REFERENCE: RGBColor = RGBColor(41, 128, 185); // blue
const COLOR_STUDENT: RGBColor = RGBColor(231, 76, 60); // red
const COLOR_ACCURATE: RGBColor = RGBColor(46, 204, 113); // green
const COLOR_SLIGHT: RGBColor = RGBColor(230, 126, 34); // orange
const COLOR_SEVERE: RGBColor = RGBColor(192, 57, 43); // dark red
const COLOR_GUIDE: RGBColor = RGBColor(180, 180, 180); // light gray

/// Deviation panel y-axis clamp, in cents.
const DEVIATION_SPAN: f32 = 200.0;

/// Generate the three-panel pitch comparison figure:
/// raw contours, warped contours, and the per-frame deviation scatter.
pub fn pitch_comparison(
    reference: &PitchSeries,
    student: &PitchSeries,
    comparison: &Comparison,
    output_path: &Path,
) -> Result<()> {
    let root =
        BitMapBackend::new(output_path, (WIDTH, PANEL_HEIGHT * 3)).into_drawing_area();
    root.fill(&WHITE).context("Failed to fill background")?;

    let panels = root.split_evenly((3, 1));

    draw_raw_contours(&panels[0], reference, student)?;
    draw_aligned_contours(&panels[1], reference, student, &comparison.pairs)?;
    draw_deviation_scatter(&panels[2], reference, comparison)?;

    root.present().context("Failed to write chart PNG")?;
    Ok(())
}

/// Generate the two-panel spectrogram comparison figure.
pub fn spectrogram_comparison(
    reference: &Spectrogram,
    student: &Spectrogram,
    output_path: &Path,
) -> Result<()> {
    let root =
        BitMapBackend::new(output_path, (WIDTH, PANEL_HEIGHT * 2)).into_drawing_area();
    root.fill(&WHITE).context("Failed to fill background")?;

    let panels = root.split_evenly((2, 1));
    draw_spectrogram(&panels[0], reference, "Reference spectrogram")?;
    draw_spectrogram(&panels[1], student, "Student spectrogram")?;

    root.present().context("Failed to write chart PNG")?;
    Ok(())
}

/// Generate the warp-path figure: student time against reference time, with
/// the ideal-tempo diagonal for contrast. Deviation from the diagonal is
/// rushing or dragging.
pub fn rhythm_alignment(
    reference: &PitchSeries,
    student: &PitchSeries,
    pairs: &[AlignedPair],
    output_path: &Path,
) -> Result<()> {
    let root = BitMapBackend::new(output_path, (1000, 700)).into_drawing_area();
    root.fill(&WHITE).context("Failed to fill background")?;

    let ref_end = reference.time(reference.len() - 1);
    let student_end = student.time(student.len() - 1);
    let max_time = ref_end.max(student_end).max(0.1);

    let mut chart = ChartBuilder::on(&root)
        .caption("Rhythm alignment", ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(35)
        .y_label_area_size(50)
        .build_cartesian_2d(0.0f32..max_time, 0.0f32..max_time)?;

    chart
        .configure_mesh()
        .x_desc("Reference time (s)")
        .y_desc("Student time (s)")
        .draw()?;

    chart
        .draw_series(LineSeries::new(
            [(0.0, 0.0), (max_time, max_time)],
            &COLOR_GUIDE,
        ))?
        .label("Even tempo")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 18, y)], COLOR_GUIDE));

    chart
        .draw_series(LineSeries::new(
            pairs
                .iter()
                .map(|p| (reference.time(p.reference), student.time(p.student))),
            &COLOR_STUDENT,
        ))?
        .label("Warp path")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 18, y)], COLOR_STUDENT));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present().context("Failed to write chart PNG")?;
    Ok(())
}

/// Split a contour into runs of consecutive voiced frames so the plot
/// breaks at unvoiced gaps instead of drawing a line across them.
fn voiced_segments(series: &PitchSeries) -> Vec<Vec<(f32, f32)>> {
    let mut segments = Vec::new();
    let mut current: Vec<(f32, f32)> = Vec::new();

    for frame in series.frames() {
        match frame.frequency {
            Some(hz) => current.push((frame.time, hz)),
            None => {
                if !current.is_empty() {
                    segments.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }

    segments
}

/// Shared y-range over both tracks, padded, with a sane fallback when a
/// track is entirely unvoiced.
fn frequency_range(reference: &PitchSeries, student: &PitchSeries) -> (f32, f32) {
    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;

    for series in [reference, student] {
        for frame in series.frames() {
            if let Some(hz) = frame.frequency {
                min = min.min(hz);
                max = max.max(hz);
            }
        }
    }

    if min.is_finite() && max > min {
        (min * 0.9, max * 1.1)
    } else {
        (50.0, 1000.0)
    }
}

type Panel<'a> = DrawingArea<BitMapBackend<'a>, plotters::coord::Shift>;

fn draw_contour_segments(
    chart: &mut ChartContext<BitMapBackend, Cartesian2d<RangedCoordf32, RangedCoordf32>>,
    segments: &[Vec<(f32, f32)>],
    color: RGBColor,
    label: &str,
) -> Result<()> {
    for (i, segment) in segments.iter().enumerate() {
        let series = chart.draw_series(LineSeries::new(segment.iter().copied(), &color))?;
        // One legend entry per track, not per segment.
        if i == 0 {
            series
                .label(label)
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 18, y)], color));
        }
    }
    Ok(())
}

fn draw_raw_contours(
    area: &Panel,
    reference: &PitchSeries,
    student: &PitchSeries,
) -> Result<()> {
    let ref_end = reference.time(reference.len() - 1);
    let student_end = student.time(student.len() - 1);
    let max_time = ref_end.max(student_end).max(0.1);
    let (y_min, y_max) = frequency_range(reference, student);

    let mut chart = ChartBuilder::on(area)
        .caption("Pitch contours (unaligned)", ("sans-serif", 18))
        .margin(8)
        .x_label_area_size(30)
        .y_label_area_size(55)
        .build_cartesian_2d(0.0f32..max_time, y_min..y_max)?;

    chart
        .configure_mesh()
        .x_desc("Time (s)")
        .y_desc("Frequency (Hz)")
        .draw()?;

    draw_contour_segments(&mut chart, &voiced_segments(reference), COLOR_REFERENCE, "Reference")?;
    draw_contour_segments(&mut chart, &voiced_segments(student), COLOR_STUDENT, "Student")?;

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    Ok(())
}

fn draw_aligned_contours(
    area: &Panel,
    reference: &PitchSeries,
    student: &PitchSeries,
    pairs: &[AlignedPair],
) -> Result<()> {
    // Both curves on the reference's time axis: the student curve is warped
    // onto the reference timeline so the two are visually comparable.
    let warped_reference: Vec<PitchSeriesPoint> = pairs
        .iter()
        .map(|p| (reference.time(p.reference), reference.frequency(p.reference)))
        .collect();
    let warped_student: Vec<PitchSeriesPoint> = pairs
        .iter()
        .map(|p| (reference.time(p.reference), student.frequency(p.student)))
        .collect();

    let ref_end = reference.time(reference.len() - 1);
    let (y_min, y_max) = frequency_range(reference, student);

    let mut chart = ChartBuilder::on(area)
        .caption("Pitch contours (time-warped)", ("sans-serif", 18))
        .margin(8)
        .x_label_area_size(30)
        .y_label_area_size(55)
        .build_cartesian_2d(0.0f32..ref_end.max(0.1), y_min..y_max)?;

    chart
        .configure_mesh()
        .x_desc("Reference time (s)")
        .y_desc("Frequency (Hz)")
        .draw()?;

    draw_contour_segments(&mut chart, &point_segments(&warped_reference), COLOR_REFERENCE, "Reference")?;
    draw_contour_segments(&mut chart, &point_segments(&warped_student), COLOR_STUDENT, "Student")?;

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    Ok(())
}

type PitchSeriesPoint = (f32, Option<f32>);

/// Like voiced_segments, but over an already-warped point list.
fn point_segments(points: &[PitchSeriesPoint]) -> Vec<Vec<(f32, f32)>> {
    let mut segments = Vec::new();
    let mut current: Vec<(f32, f32)> = Vec::new();

    for &(time, frequency) in points {
        match frequency {
            Some(hz) => current.push((time, hz)),
            None => {
                if !current.is_empty() {
                    segments.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }

    segments
}

fn bucket_color(bucket: Bucket) -> RGBColor {
    match bucket {
        Bucket::Accurate => COLOR_ACCURATE,
        Bucket::Slight => COLOR_SLIGHT,
        Bucket::Severe => COLOR_SEVERE,
    }
}

fn draw_deviation_scatter(
    area: &Panel,
    reference: &PitchSeries,
    comparison: &Comparison,
) -> Result<()> {
    let ref_end = reference.time(reference.len() - 1).max(0.1);

    let mut chart = ChartBuilder::on(area)
        .caption(
            "Pitch deviation (positive = sharp, negative = flat)",
            ("sans-serif", 18),
        )
        .margin(8)
        .x_label_area_size(30)
        .y_label_area_size(55)
        .build_cartesian_2d(0.0f32..ref_end, -DEVIATION_SPAN..DEVIATION_SPAN)?;

    chart
        .configure_mesh()
        .x_desc("Reference time (s)")
        .y_desc("Deviation (cents)")
        .draw()?;

    // Guide lines: zero, and the severe boundary either side.
    for y in [0.0, 50.0, -50.0] {
        chart.draw_series(LineSeries::new(
            [(0.0, y), (ref_end, y)],
            &COLOR_GUIDE,
        ))?;
    }

    chart.draw_series(comparison.records.iter().filter_map(|record| {
        let cents = record.cents?;
        let bucket = record.bucket?;
        let y = cents.clamp(-DEVIATION_SPAN, DEVIATION_SPAN);
        Some(Circle::new(
            (reference.time(record.reference_index), y),
            2,
            bucket_color(bucket).filled(),
        ))
    }))?;

    Ok(())
}

fn draw_spectrogram(area: &Panel, spectrogram: &Spectrogram, title: &str) -> Result<()> {
    let frame_count = spectrogram.frames.len();
    let bin_count = spectrogram.frames[0].len();
    let max_time = frame_count as f32 * spectrogram.hop_secs;
    let max_freq = bin_count as f32 * spectrogram.bin_hz;

    let mut chart = ChartBuilder::on(area)
        .caption(title, ("sans-serif", 18))
        .margin(8)
        .x_label_area_size(30)
        .y_label_area_size(55)
        .build_cartesian_2d(0.0f32..max_time, 0.0f32..max_freq)?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc("Time (s)")
        .y_desc("Frequency (Hz)")
        .draw()?;

    // Cap the number of drawn columns so a full song doesn't become a
    // million rectangles; stride frames and widen each cell to match.
    let stride = (frame_count / 1600).max(1);
    let cell_w = spectrogram.hop_secs * stride as f32;

    chart.draw_series(
        spectrogram
            .frames
            .iter()
            .enumerate()
            .step_by(stride)
            .flat_map(|(t, frame)| {
                let t0 = t as f32 * spectrogram.hop_secs;
                frame.iter().enumerate().map(move |(b, &db)| {
                    let f0 = b as f32 * spectrogram.bin_hz;
                    // Map [-80, 0] dB to dark blue → bright yellow.
                    let level = (db + 80.0) / 80.0;
                    let color = HSLColor(
                        0.66 - 0.5 * level as f64,
                        0.9,
                        0.08 + 0.55 * level as f64,
                    );
                    Rectangle::new(
                        [(t0, f0), (t0 + cell_w, f0 + spectrogram.bin_hz)],
                        color.filled(),
                    )
                })
            }),
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::PitchFrame;

    fn series(freqs: &[Option<f32>]) -> PitchSeries {
        let frames = freqs
            .iter()
            .enumerate()
            .map(|(i, &frequency)| PitchFrame {
                time: i as f32 * 0.025,
                frequency,
            })
            .collect();
        PitchSeries::new(frames).unwrap()
    }

    #[test]
    fn segments_split_at_unvoiced_gaps() {
        let s = series(&[
            Some(220.0),
            Some(221.0),
            None,
            Some(330.0),
            None,
            None,
            Some(440.0),
        ]);
        let segments = voiced_segments(&s);
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0].len(), 2);
        assert_eq!(segments[1].len(), 1);
        assert_eq!(segments[2].len(), 1);
    }

    #[test]
    fn frequency_range_falls_back_on_unvoiced_input() {
        let silent = series(&[None, None]);
        let (lo, hi) = frequency_range(&silent, &silent);
        assert!(lo < hi, "fallback range must still be valid");
    }

    #[test]
    fn frequency_range_pads_the_extremes() {
        let a = series(&[Some(100.0)]);
        let b = series(&[Some(400.0)]);
        let (lo, hi) = frequency_range(&a, &b);
        assert!(lo < 100.0);
        assert!(hi > 400.0);
    }
}
