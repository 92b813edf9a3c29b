use fourier_synth::pipeline::{
    chord::chord_events, combine, mix, normalize, parse_composition, ChordTiming, ChordType,
};
use fourier_synth::generator::{Adsr, Instrument, NoteRenderer};
use fourier_synth::wav::{read_wav, write_wav, BitDepth};
use fourier_synth::{render_composition, RenderConfig, SynthError};

fn low_rate_config() -> RenderConfig {
    RenderConfig {
        sample_rate: 4000,
        ..Default::default()
    }
}

#[test]
fn test_composition_to_wav_and_back() {
    let text = r#"
0|   chord c maj delay=0.1 duration=0.5
0.5| arpeggio a min delay=0.1 total=0.4 instrument=piano
1.0| melody c d e - g step=0.2 duration=0.15
"#;
    let config = low_rate_config();
    let composition = parse_composition(text).unwrap();
    let track = render_composition(&composition, &config).unwrap();

    // Melody: last note starts at 1.0 + 4 * 0.2 and lasts 0.15 + 0.05 release
    assert!(track.len().abs_diff(8000) <= 1);
    assert!((track.peak() - 1.0).abs() < 1e-9);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("song.wav");
    write_wav(&path, &track, config.sample_rate, BitDepth::Pcm16).unwrap();

    let (samples, rate) = read_wav(&path).unwrap();
    assert_eq!(rate, 4000);
    assert_eq!(samples.len(), track.len());
    for (a, b) in track.iter().zip(samples.iter()) {
        assert!((a - b).abs() < 1e-3);
    }
}

#[test]
fn test_bundled_demo_renders() {
    let text = std::fs::read_to_string(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/demos/progression.txt"
    ))
    .unwrap();
    let config = RenderConfig {
        sample_rate: 2000,
        ..Default::default()
    };
    let track = render_composition(&parse_composition(&text).unwrap(), &config).unwrap();

    // Last cue: chord at 18.0 + 3 * 19.2, 1.2s long with 0.6s release
    let expected = ((18.0 + 3.0 * 19.2 + 1.8) * 2000.0f64).ceil() as usize;
    assert!(track.len().abs_diff(expected) <= 1);
}

#[test]
fn test_chord_scenario_from_events() {
    let renderer = NoteRenderer::new(4000, true);
    let events = chord_events(
        &renderer,
        440.0,
        ChordType::Major,
        ChordTiming {
            delay: 0.3,
            duration: 1.0,
        },
        Adsr::default(),
        &Instrument::Digital.profile(),
    )
    .unwrap();

    let offsets: Vec<f64> = events.iter().map(|e| e.offset).collect();
    assert_eq!(offsets.len(), 3);
    for (got, want) in offsets.iter().zip([0.0, 0.3, 0.6]) {
        assert!((got - want).abs() < 1e-12);
    }

    let forward = mix(&events, 4000);
    let mut reversed = events.clone();
    reversed.reverse();
    assert_eq!(mix(&reversed, 4000), forward);

    let normalized = normalize(&combine(&[forward.clone()]), 1.0);
    assert!((normalized.peak() - 1.0).abs() < 1e-9);
}

#[test]
fn test_invalid_envelope_surfaces_from_render() {
    let composition = parse_composition("0| note a duration=0.05 attack=0.1").unwrap();
    let err = render_composition(&composition, &low_rate_config()).unwrap_err();
    assert!(matches!(err, SynthError::InvalidEnvelope { .. }));
}
