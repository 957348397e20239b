use collate_engine::{
    CancelToken, DiffEngine, DissimilarityReason, EngineError, EngineEvent, EngineSettings,
};

#[test]
fn unrelated_documents_short_circuit_with_default_settings() {
    let engine = DiffEngine::default();
    let base = vec!["alpha".to_string(); 25_000];
    let comparison = vec!["zeta".to_string(); 25_000];

    let mut events = 0usize;
    let result = engine.compare(&base, &comparison, &CancelToken::new(), |_| {
        events += 1;
        Ok(())
    });

    match result {
        Err(EngineError::TooDissimilar(DissimilarityReason::Prefilter { unigram, bigram })) => {
            assert_eq!(unigram, 0.0);
            assert_eq!(bigram, 0.0);
        }
        other => panic!("expected prefilter short-circuit, got {other:?}"),
    }
    assert_eq!(events, 0, "nothing may be emitted before the rejection");
}

#[test]
fn related_documents_pass_the_gate_and_complete() {
    let settings = EngineSettings {
        batch_size: 800,
        ..EngineSettings::default()
    };
    let engine = DiffEngine::new(settings).unwrap();

    // Long enough to arm the prefilter, similar enough to pass it
    let base: Vec<String> = (0..20_000).map(|i| format!("w{i}")).collect();
    let mut comparison = base.clone();
    for i in (0..comparison.len()).step_by(100) {
        comparison[i] = format!("r{i}");
    }

    let mut chunk_count = 0usize;
    let stats = engine
        .compare(&base, &comparison, &CancelToken::new(), |event| {
            if let EngineEvent::Chunk(_) = event {
                chunk_count += 1;
            }
            Ok(())
        })
        .expect("related documents must compare successfully");

    assert_eq!(stats.base_word_count, 20_000);
    assert_eq!(stats.comparison_word_count, 20_000);
    assert!(chunk_count > 1, "a 20k-word diff must stream several chunks");
    assert_eq!(stats.chunks_emitted, chunk_count);
}
