use approx::assert_relative_eq;
use wavecache::{
    ChannelId, Dtype, MinMaxConfig, SampleSeries, TimeWindow, WaveError, prepare_window,
    reduce_to_pixels,
};

fn channel() -> ChannelId {
    ChannelId::new("BW", "MANZ", "", "EHZ")
}

fn ramp(start: f64, rate: f64, npts: usize) -> SampleSeries {
    let samples = (0..npts).map(|i| i as f64).collect();
    SampleSeries::new(channel(), start, rate, Dtype::F32, samples).expect("valid series")
}

fn pixels(pixel_count: usize) -> MinMaxConfig {
    MinMaxConfig {
        pixel_count,
        log_base: None,
    }
}

#[test]
fn output_keeps_identity_and_bounds() {
    let series = ramp(100.0, 1.0, 1000);
    let reduced = reduce_to_pixels(&series, pixels(10)).expect("reduce");

    assert_eq!(reduced.npts(), 10);
    assert_eq!(reduced.channel(), series.channel());
    assert_eq!(reduced.dtype(), Dtype::F32);
    assert!(!reduced.is_masked());
    assert_eq!(reduced.start(), series.start());
    assert_relative_eq!(reduced.end(), series.end(), epsilon = 1e-9);
    for &v in reduced.values() {
        assert!((0.0..=100.0).contains(&v));
    }
    // Every bucket of a ramp has the same peak-to-peak amplitude, so after
    // rescaling every pixel sits at the maximum.
    for &v in reduced.values() {
        assert_relative_eq!(v, 100.0, epsilon = 1e-9);
    }
}

#[test]
fn fully_masked_bucket_stays_exactly_zero() {
    let values: Vec<f64> = (0..1000).map(|i| i as f64).collect();
    let mask: Vec<bool> = (0..1000).map(|i| (500..600).contains(&i)).collect();
    let series =
        SampleSeries::new_masked(channel(), 0.0, 1.0, Dtype::F32, values, mask).expect("series");

    let reduced = reduce_to_pixels(&series, pixels(10)).expect("reduce");

    assert_eq!(reduced.npts(), 10);
    // The gap bucket reads 0 and is never lifted to the visibility floor.
    assert_eq!(reduced.values()[5], 0.0);
    for (i, &v) in reduced.values().iter().enumerate() {
        if i != 5 {
            assert_relative_eq!(v, 100.0, epsilon = 1e-9);
        }
    }
}

#[test]
fn faint_activity_is_clamped_to_the_visibility_floor() {
    let mut samples = vec![0.0; 1000];
    // One loud bucket and one barely-active bucket.
    samples[0] = 10_000.0;
    samples[250] = 0.001;
    let series = SampleSeries::new(channel(), 0.0, 1.0, Dtype::F32, samples).expect("series");

    let reduced = reduce_to_pixels(&series, pixels(10)).expect("reduce");

    assert_relative_eq!(reduced.values()[0], 100.0, epsilon = 1e-9);
    assert_eq!(reduced.values()[2], 0.5);
    assert_eq!(reduced.values()[5], 0.0);
}

#[test]
fn log_scaling_compresses_before_rescaling() {
    let mut samples = vec![0.0; 30];
    // Bucket peak-to-peak amplitudes 0, 9 and 99 become log10 values 0, 1
    // and 2, then rescale to 0, 50 and 100.
    samples[15] = 9.0;
    samples[25] = 99.0;
    let series = SampleSeries::new(channel(), 0.0, 1.0, Dtype::F32, samples).expect("series");

    let config = MinMaxConfig {
        pixel_count: 3,
        log_base: Some(10.0),
    };
    let reduced = reduce_to_pixels(&series, config).expect("reduce");

    assert_relative_eq!(reduced.values()[0], 0.0);
    assert_relative_eq!(reduced.values()[1], 50.0, epsilon = 1e-9);
    assert_relative_eq!(reduced.values()[2], 100.0, epsilon = 1e-9);
}

#[test]
fn too_few_samples_for_the_pixel_count_is_an_error() {
    let series = ramp(0.0, 1.0, 9);
    assert!(matches!(
        reduce_to_pixels(&series, pixels(10)),
        Err(WaveError::InvalidData(_))
    ));
}

#[test]
fn invalid_log_base_is_rejected() {
    let series = ramp(0.0, 1.0, 100);
    let config = MinMaxConfig {
        pixel_count: 10,
        log_base: Some(1.0),
    };
    assert!(matches!(
        reduce_to_pixels(&series, config),
        Err(WaveError::InvalidData(_))
    ));
}

#[test]
fn prepare_window_pads_uncovered_pixels_to_zero() {
    let series = ramp(0.0, 1.0, 100);
    let window = TimeWindow::new(0.0, 199.0).expect("valid window");

    let reduced = prepare_window(&series, window, pixels(20)).expect("prepare");

    assert_eq!(reduced.npts(), 20);
    assert_eq!(reduced.start(), 0.0);
    assert_relative_eq!(reduced.end(), 199.0, epsilon = 1e-9);
    // The first half of the window is covered by data, the second half is
    // padding and must read as flat zero.
    for &v in &reduced.values()[..10] {
        assert_relative_eq!(v, 100.0, epsilon = 1e-9);
    }
    for &v in &reduced.values()[10..] {
        assert_eq!(v, 0.0);
    }
}
