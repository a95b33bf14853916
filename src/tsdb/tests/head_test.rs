use quickcheck::{quickcheck, TestResult};

use memtsdb_tsdb::{decode_chunk, Head, HeadOptions, Labels, Sample, TsdbError};

fn labels() -> Labels {
    Labels::from_pairs(&[
        ("__name__", "http_requests_total"),
        ("code", "200"),
        ("method", "get"),
    ])
}

#[test]
fn test_chunk_cutting() {
    let head = Head::new();
    let labels = labels();

    for i in 0..120_u64 {
        head.append(&labels, 1_000 + i * 15, i as f64);
    }
    {
        let series = head.get_series(&labels).unwrap();
        let series = series.lock();
        assert_eq!(series.num_chunks(), 1);
        assert!(series.previous().is_none());
        assert_eq!(series.head_chunk().sample_count(), 120);
    }

    head.append(&labels, 1_000 + 120 * 15, 120.0);
    {
        let series = head.get_series(&labels).unwrap();
        let series = series.lock();
        assert_eq!(series.num_chunks(), 2);
        assert_eq!(series.head_chunk().sample_count(), 1);

        let previous = series.previous().unwrap();
        assert_eq!(previous.sample_count(), 120);
        assert_eq!(previous.min_time(), Some(1_000));
    }

    for i in 121..242_u64 {
        head.append(&labels, 1_000 + i * 15, i as f64);
    }
    let chunks = head.chunks(&labels).unwrap();
    assert_eq!(chunks.len(), 3);
    assert_eq!(
        chunks.iter().map(|c| c.sample_count()).collect::<Vec<_>>(),
        vec![2, 120, 120]
    );
    assert_eq!(head.num_chunks(), 3);
    assert_eq!(head.num_samples(), 242);
}

#[test]
fn test_read_series_head_only() {
    let head = Head::new();
    let labels = labels();
    for i in 0..130_u64 {
        head.append(&labels, i * 60, i as f64);
    }

    let samples = head.read_series(&labels).unwrap().unwrap();
    assert_eq!(samples.len(), 10);
    assert_eq!(samples[0], Sample::new(120 * 60, 120.0));

    let history = head.read_series_history(&labels).unwrap().unwrap();
    assert_eq!(history.len(), 130);
    for (i, s) in history.iter().enumerate() {
        assert_eq!(*s, Sample::new(i as u64 * 60, i as f64));
    }
}

#[test]
fn test_unknown_series() {
    let head = Head::new();
    head.append(&labels(), 10, 1.0);

    let unknown = Labels::from_pairs(&[("__name__", "not_there")]);
    assert!(head.get_series(&unknown).is_none());
    assert!(head.read_series(&unknown).unwrap().is_none());
    assert!(head.read_series_history(&unknown).unwrap().is_none());

    // reads never create series
    assert_eq!(head.num_series(), 1);
}

#[test]
fn test_concrete_scenario() {
    let head = Head::new();
    let labels = labels();

    head.append(&labels, 1745755810, 2.75231);
    {
        let series = head.get_series(&labels).unwrap();
        let series = series.lock();
        let b = series.head_chunk().raw_bytes();
        assert_eq!(&b[0..2], &1_u16.to_be_bytes());
        assert_eq!(&b[2..10], &1745755810_u64.to_be_bytes());
        assert_eq!(&b[10..18], &2.75231_f64.to_bits().to_be_bytes());
    }

    head.append(&labels, 1745755840, 2.75231 + 1.0);
    let samples = head.read_series(&labels).unwrap().unwrap();
    assert_eq!(
        samples.iter().map(|s| s.timestamp).collect::<Vec<_>>(),
        vec![1745755810, 1745755840]
    );
    assert_eq!(
        samples.iter().map(|s| s.value).collect::<Vec<_>>(),
        vec![2.75231, 2.75231 + 1.0]
    );
}

#[test]
fn test_snapshot_decodes_without_lock() {
    let head = Head::new();
    let labels = labels();
    for i in 0..50_u64 {
        head.append(&labels, i, i as f64);
    }

    let chunks = head.chunks(&labels).unwrap();
    let series = head.get_series(&labels).unwrap();
    let _guard = series.lock();

    // decoding a snapshot does not touch the series while it is locked
    let samples = decode_chunk(chunks[0].raw_bytes()).unwrap();
    assert_eq!(samples.len(), 50);
}

#[test]
fn test_corrupt_snapshot() {
    let head = Head::new();
    let labels = labels();
    for i in 0..5_u64 {
        head.append(&labels, i * 10, i as f64 * 0.5);
    }

    let chunks = head.chunks(&labels).unwrap();
    let b = chunks[0].raw_bytes();
    assert!(matches!(
        decode_chunk(&b[..b.len() / 2]),
        Err(TsdbError::CorruptChunk { declared: 5, .. })
    ));
}

#[test]
fn test_small_chunks() {
    let opts = HeadOptions {
        samples_per_chunk: 2,
        ..Default::default()
    };
    let head = Head::with_options(opts).unwrap();
    let labels = labels();
    for i in 0..7_u64 {
        head.append(&labels, i, i as f64);
    }

    assert_eq!(head.num_chunks(), 4);
    assert_eq!(head.read_series(&labels).unwrap().unwrap().len(), 1);
    assert_eq!(head.read_series_history(&labels).unwrap().unwrap().len(), 7);
}

#[test]
fn test_history_round_trip_quickcheck() {
    // Arbitrary timestamps, including ones whose delta-of-delta does not fit
    // the widest bucket, survive through the chunk chain.
    fn prop(input: Vec<(u64, u64)>) -> TestResult {
        let head = Head::new();
        let labels = Labels::from_pairs(&[("__name__", "prop")]);
        for (t, bits) in &input {
            head.append(&labels, *t, f64::from_bits(*bits));
        }

        let history = match head.read_series_history(&labels) {
            Ok(Some(history)) => history,
            Ok(None) => return TestResult::from_bool(input.is_empty()),
            Err(e) => return TestResult::error(e.to_string()),
        };

        TestResult::from_bool(
            history.len() == input.len()
                && history
                    .iter()
                    .zip(&input)
                    .all(|(s, (t, bits))| s.bit_eq(&Sample::new(*t, f64::from_bits(*bits)))),
        )
    }

    quickcheck(prop as fn(Vec<(u64, u64)>) -> TestResult);
}
