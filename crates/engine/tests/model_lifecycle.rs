//! Integration tests for the conversion model: train, evaluate, persist, reload

use lead_scoring_config::TrainingConfig;
use lead_scoring_engine::{
    ConversionModel, Error, FeatureEncoder, Lead, LeadQuality, LeadScoringEngine, FEATURE_NAMES,
    UNKNOWN_CODE,
};

/// Synthetic history where conversions follow time on site and lead quality
fn history(n: u64) -> Vec<Lead> {
    let sources = ["Google", "Direct Traffic", "Organic Search", "Reference"];
    let activities = ["Email Opened", "SMS Sent", "Page Visited on Website"];
    (0..n)
        .map(|i| {
            let engaged = i % 5 < 2;
            let mut lead = Lead::new(i)
                .with_source(sources[(i % 4) as usize])
                .with_last_activity(activities[(i % 3) as usize])
                .with_origin(if i % 2 == 0 { "API" } else { "Landing Page Submission" })
                .with_total_visits((i % 9) as u32)
                .with_page_views_per_visit((i % 5) as f64 * 0.5)
                .with_converted(engaged);
            lead = if engaged {
                lead.with_time_on_site(800.0 + (i % 17) as f64 * 30.0)
                    .with_quality(LeadQuality::High)
            } else {
                lead.with_time_on_site((i % 23) as f64 * 15.0)
                    .with_quality(LeadQuality::Low)
            };
            lead
        })
        .collect()
}

fn config() -> TrainingConfig {
    TrainingConfig {
        n_trees: 25,
        ..TrainingConfig::default()
    }
}

#[test]
fn test_train_save_load_predicts_identically() {
    let outcome = ConversionModel::train(&history(200), &config()).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.json");

    outcome.model.save(&path).unwrap();
    let restored = ConversionModel::load(&path).unwrap();

    assert_eq!(restored.trained_at(), outcome.model.trained_at());
    assert_eq!(restored.training_config(), &config());
    for lead in history(50) {
        assert_eq!(
            restored.predict_lead(&lead),
            outcome.model.predict_lead(&lead),
            "lead {}",
            lead.id
        );
    }
    assert_eq!(restored.feature_importance(), outcome.model.feature_importance());
}

#[test]
fn test_same_seed_same_model() {
    let leads = history(150);
    let first = ConversionModel::train(&leads, &config()).unwrap();
    let second = ConversionModel::train(&leads, &config()).unwrap();

    assert_eq!(first.evaluation, second.evaluation);
    assert_eq!(first.model.forest(), second.model.forest());
    assert_eq!(
        first.model.feature_importance(),
        second.model.feature_importance()
    );
}

#[test]
fn test_evaluation_is_diagnostic() {
    let outcome = ConversionModel::train(&history(200), &config()).unwrap();
    let report = &outcome.evaluation;

    assert_eq!(report.test_samples, 40);
    assert_eq!(report.train_samples, 160);
    assert_eq!(
        report.converted.support + report.not_converted.support,
        report.test_samples
    );
    let auc = report.roc_auc.expect("both classes held out");
    assert!(auc > 0.9, "auc {}", auc);
    assert!(report.accuracy > 0.85, "accuracy {}", report.accuracy);
}

#[test]
fn test_importance_names_every_feature() {
    let outcome = ConversionModel::train(&history(200), &config()).unwrap();
    let ranked = outcome.model.feature_importance();

    let mut names: Vec<&str> = ranked.iter().map(|f| f.feature.as_str()).collect();
    names.sort_unstable();
    let mut expected = FEATURE_NAMES.to_vec();
    expected.sort_unstable();
    assert_eq!(names, expected);

    // Time on site, quality and page views each separate the classes
    let separators = ["time_on_site", "lead_quality", "page_views_per_visit"];
    assert!(
        separators.contains(&ranked[0].feature.as_str()),
        "top feature {}",
        ranked[0].feature
    );
}

#[test]
fn test_unseen_categories_score_without_error() {
    let leads = history(100);
    let outcome = ConversionModel::train(&leads, &config()).unwrap();

    let fresh = Lead::new(9_999)
        .with_source("Partner Webinar")
        .with_last_activity("Visited Booth")
        .with_origin("Trade Show")
        .with_time_on_site(950.0);
    let vector = outcome.model.encoder().transform(&fresh);
    assert_eq!(vector[3], UNKNOWN_CODE);
    assert_eq!(vector[4], UNKNOWN_CODE);
    assert_eq!(vector[6], UNKNOWN_CODE);

    let probability = outcome.model.predict_lead(&fresh);
    assert!((0.0..=1.0).contains(&probability));
}

#[test]
fn test_encoder_round_trip_on_seen_leads() {
    let leads = history(60);
    let encoder = FeatureEncoder::fit(&leads);
    let first = encoder.transform_batch(&leads);

    let json = serde_json::to_string(&encoder).unwrap();
    let restored: lead_scoring_engine::FittedEncoder = serde_json::from_str(&json).unwrap();
    assert_eq!(restored.transform_batch(&leads), first);
}

#[test]
fn test_insufficient_data_returns_no_model() {
    let mut engine = LeadScoringEngine::new();
    let leads: Vec<Lead> = (0..30).map(|i| Lead::new(i).with_converted(true)).collect();
    assert!(matches!(
        engine.train(&leads, &config()),
        Err(Error::TrainingDataInsufficient { positives: 30, .. })
    ));
    assert!(engine.model().is_none());
    assert!(matches!(
        engine.conversion_probability(&leads[0]),
        Err(Error::UnfittedEncoder)
    ));
}

#[test]
fn test_unlabelled_only_is_insufficient() {
    let leads: Vec<Lead> = (0..10).map(|i| Lead::new(i).with_source("Google")).collect();
    assert!(matches!(
        ConversionModel::train(&leads, &config()),
        Err(Error::TrainingDataInsufficient { samples: 0, .. })
    ));
}
