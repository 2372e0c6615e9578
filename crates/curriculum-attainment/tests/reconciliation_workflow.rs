use curriculum_attainment::config::AnalysisConfig;
use curriculum_attainment::workflows::attainment::normalizer::{normalize_code, normalize_name};
use curriculum_attainment::workflows::attainment::{
    parse_matrix, parse_scores, AttainmentImporter, AttainmentPipeline, IndicatorId,
    MajorIndicator, Strength, StrengthWeights,
};

const EPSILON: f64 = 1e-9;

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < EPSILON,
        "expected {expected}, got {actual}"
    );
}

fn indicator(raw: &str) -> IndicatorId {
    IndicatorId::parse(raw).expect("valid indicator")
}

#[test]
fn padded_code_scenario_produces_expected_facts_and_scores() {
    let scores = "course_code,course_name,attainment\n00123456,微积分I,0.82\n";
    let matrix = "course_code,course_name,1-1,1-2\n123456,微积分1,H,M\n";

    let report =
        AttainmentImporter::from_readers(scores.as_bytes(), matrix.as_bytes(), AnalysisConfig::batch())
            .expect("import succeeds");

    assert_eq!(report.match_log.len(), 1);
    let entry = &report.match_log[0];
    assert_eq!(entry.match_strategy, "Code Padded");
    assert_eq!(entry.matched_code, "00123456");
    assert_eq!(entry.matched_name, "微积分I");
    assert_eq!(entry.attainment, Some(0.82));

    let facts: Vec<(&str, String, Strength, f64)> = report
        .facts
        .iter()
        .map(|fact| {
            (
                fact.course_name.as_str(),
                fact.indicator.to_string(),
                fact.strength,
                fact.attainment,
            )
        })
        .collect();
    assert_eq!(
        facts,
        vec![
            ("微积分1", "1-1".to_string(), Strength::H, 0.82),
            ("微积分1", "1-2".to_string(), Strength::M, 0.82),
        ]
    );

    for score in &report.indicators {
        assert_close(score.weighted_score, 0.82);
    }
    let requirement = report
        .requirement(MajorIndicator::new(1))
        .expect("requirement 1 present");
    assert_close(requirement.composite_score, 0.82);
    assert!(report.flagged.is_empty());
    assert!(report.diagnostics.is_clean());
}

#[test]
fn padding_equivalence_holds_for_either_matrix_form() {
    let scores = "course_code,course_name,attainment\n123456,普通化学,0.9\n";
    for matrix_code in ["123456", "00123456"] {
        let matrix = format!("course_code,course_name,1-1\n{matrix_code},另一个名字,H\n");
        let report = AttainmentImporter::from_readers(
            scores.as_bytes(),
            matrix.as_bytes(),
            AnalysisConfig::batch(),
        )
        .expect("import succeeds");
        assert_eq!(report.match_log[0].matched_name, "普通化学", "matrix code {matrix_code}");
    }
}

#[test]
fn not_found_courses_never_reach_the_fact_table() {
    let scores = "course_code,course_name,attainment\n1,光学,0.9\n2,热学,0.6\n";
    let matrix = "course_code,course_name,1-1,1-2,2-1\n\
1,光学,H,,M\n\
77,量子信息科学前沿,H,H,H\n\
2,热学,,L,\n";

    let report =
        AttainmentImporter::from_readers(scores.as_bytes(), matrix.as_bytes(), AnalysisConfig::batch())
            .expect("import succeeds");

    assert!(report
        .facts
        .iter()
        .all(|fact| fact.course_name != "量子信息科学前沿"));
    assert_eq!(report.facts.len(), 3);
    assert_eq!(report.match_log[1].match_strategy, "Not Found");
    assert_eq!(report.summary().unmatched_courses, 1);
    // the missing course is excluded, not scored as zero
    let one_one = report
        .indicators
        .iter()
        .find(|score| score.indicator == indicator("1-1"))
        .expect("1-1 scored");
    assert_close(one_one.weighted_score, 0.9);
}

#[test]
fn thresholds_flag_requirements_below_the_floor() {
    let scores = "course_code,course_name,attainment\n1,光学,0.82\n2,热学,0.79999\n";
    let matrix = "course_code,course_name,1-1,2-1\n1,光学,H,\n2,热学,,H\n";

    let report =
        AttainmentImporter::from_readers(scores.as_bytes(), matrix.as_bytes(), AnalysisConfig::batch())
            .expect("import succeeds");

    assert_eq!(report.flagged, vec![MajorIndicator::new(2)]);
    assert!(!report.is_flagged(MajorIndicator::new(1)));
    assert_eq!(report.weak_points.len(), 1);
    assert_eq!(report.weak_points[0].indicator, indicator("2-1"));

    let interactive = AttainmentImporter::from_readers(
        scores.as_bytes(),
        matrix.as_bytes(),
        AnalysisConfig::interactive(),
    )
    .expect("import succeeds");
    assert!(interactive.flagged.is_empty());
}

#[test]
fn changing_weights_only_moves_composite_scores() {
    let scores = parse_scores(
        "course_code,course_name,attainment\n1,a,0.95\n2,b,0.7\n3,c,0.55\n".as_bytes(),
    )
    .expect("scores parse");
    let matrix = parse_matrix(
        "course_code,course_name,1-1,1-2\n1,a,H,\n2,b,M,H\n3,c,L,M\n".as_bytes(),
    )
    .expect("matrix parses");

    let batch = AttainmentPipeline::new(AnalysisConfig::batch())
        .run(&scores, &matrix)
        .expect("batch run");
    let custom = AttainmentPipeline::new(
        AnalysisConfig::batch().with_weights(StrengthWeights::new(0.2, 0.3, 0.5)),
    )
    .run(&scores, &matrix)
    .expect("custom run");

    let left = &batch.requirements[0];
    let right = &custom.requirements[0];
    for strength in Strength::ordered() {
        assert_eq!(
            left.per_strength_score(strength),
            right.per_strength_score(strength)
        );
    }
    assert!((left.composite_score - right.composite_score).abs() > EPSILON);
    assert_eq!(batch.strength_stats, custom.strength_stats);
}

#[test]
fn renormalises_when_high_support_is_absent() {
    let scores = "course_code,course_name,attainment\n1,a,0.9\n2,b,0.6\n";
    let matrix = "course_code,course_name,4-1\n1,a,M\n2,b,L\n";

    let report =
        AttainmentImporter::from_readers(scores.as_bytes(), matrix.as_bytes(), AnalysisConfig::batch())
            .expect("import succeeds");

    assert_close(
        report.indicators[0].weighted_score,
        (0.9 * 0.25 + 0.6 * 0.05) / 0.30,
    );
    assert_eq!(report.requirements[0].high_score, None);
}

#[test]
fn data_quality_issues_are_collected_not_fatal() {
    let scores = "课程代码,课程名称,达成度\n\
1001,化学原理,0.7\n\
1001,化学原理（重修）,0.95\n\
1002,无机化学,缺考\n";
    let matrix = "课程编码,课程名称,1-1,1-2\n\
1001,化学原理,H,X\n\
1002,无机化学,M,\n\
1003,天文学导论,H,\n";

    let report =
        AttainmentImporter::from_readers(scores.as_bytes(), matrix.as_bytes(), AnalysisConfig::batch())
            .expect("import succeeds");

    let diagnostics = &report.diagnostics;
    assert_eq!(diagnostics.duplicates.len(), 1);
    assert_eq!(diagnostics.invalid_attainment.len(), 1);
    assert_eq!(diagnostics.invalid_attainment[0].raw_value, "缺考");
    assert_eq!(diagnostics.excluded.len(), 1);
    assert_eq!(diagnostics.excluded[0].matrix_name, "无机化学");
    assert_eq!(diagnostics.unknown_strengths.len(), 1);
    assert_eq!(diagnostics.unmatched.len(), 1);
    assert_eq!(diagnostics.messages().len(), diagnostics.warning_count());

    assert_eq!(report.facts.len(), 1);
    assert_eq!(report.facts[0].attainment, 0.7);
}

#[test]
fn normalization_is_idempotent_for_messy_identifiers() {
    let samples = [
        "  0012345.0",
        "大学英语Ⅳ（二）",
        "科学——技术--社会",
        "Python程序设计 II",
        "VIII",
        "IIII",
    ];
    for sample in samples {
        let code = normalize_code(sample);
        assert_eq!(normalize_code(&code), code);
        let name = normalize_name(sample);
        assert_eq!(normalize_name(&name), name);
    }
}
