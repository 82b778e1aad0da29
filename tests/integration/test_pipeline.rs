//! End-to-end tests of the report pipeline: session to LINE flex JSON.
//!
//! These run the same path the server takes for a game report, without any
//! network access.

use learnbot_report::{
    compose, parse, render_report, CardNode, CardRenderer, CardSerializer, FlexSerializer,
    OutlineSerializer, ScoredSession, SessionGenerator,
};
use learnbot_server::{build_prompt, OutboundMessage, REPORT_ALT_TEXT};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::Value;

fn scenario() -> ScoredSession {
    ScoredSession::builder()
        .attitude_score(85.0)
        .effectiveness_score(92.0)
        .concentration_score(70.0)
        .correct_count(10)
        .wrong_count(2)
        .unanswered_count(0)
        .avg_answer_time(12.0)
        .total_time(1800.0)
        .build()
}

/// Collects every text node's content in document order.
fn texts(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            if map.get("type").and_then(Value::as_str) == Some("text") {
                if let Some(text) = map.get("text").and_then(Value::as_str) {
                    out.push(text.to_string());
                }
            }
            for child in map.values() {
                texts(child, out);
            }
        }
        Value::Array(items) => items.iter().for_each(|item| texts(item, out)),
        _ => {}
    }
}

#[test]
fn test_scenario_report_renders_expected_sections() {
    let text = compose(&scenario(), "多做練習題");
    let report = parse(&text);

    assert_eq!(report.sections.len(), 3);
    assert_eq!(report.sections[0].stars, "⭐⭐⭐⭐☆");
    assert!(report.sections[0].content[0].contains("雷射"));
    assert_eq!(report.sections[1].stars, "⭐⭐⭐⭐⭐");
    assert!(report.sections[1].content[0].contains("學霸"));
    assert!(report.sections[1].stats.iter().all(|s| !s.contains("未作答")));
    assert!(report.sections[2].content[0].contains("穩健"));
    assert_eq!(report.ai_advice, "多做練習題");
    assert!(report.motivation.starts_with("🚀"));

    let json = FlexSerializer::new()
        .serialize(&CardRenderer::new().render(&report))
        .unwrap();
    let mut found = Vec::new();
    texts(&json, &mut found);

    assert!(found.contains(&"學習成果報告".to_string()));
    assert!(found.contains(&"⭐⭐⭐⭐☆".to_string()));
    assert!(found.contains(&"92.0分".to_string()));
    assert!(found.contains(&"AI 專屬建議".to_string()));
    assert!(found.contains(&"多做練習題".to_string()));
    // Motivation is parsed but never rendered.
    assert!(!found.iter().any(|t| t.starts_with("🚀")));
}

#[test]
fn test_flex_json_shape() {
    let card = render_report(&compose(&scenario(), "加油"));
    let json: Value =
        serde_json::from_str(&FlexSerializer::new().generate(&card).unwrap()).unwrap();

    assert_eq!(json["type"], "bubble");
    assert_eq!(json["size"], "giga");
    assert_eq!(json["direction"], "ltr");
    assert_eq!(json["header"]["backgroundColor"], "#667eea");
    assert_eq!(json["body"]["backgroundColor"], "#f8f9ff");

    let body = json["body"]["contents"].as_array().unwrap();
    let palette: Vec<&str> = body
        .iter()
        .filter(|node| node["type"] == "box" && node["cornerRadius"] == "lg")
        .filter_map(|node| node["backgroundColor"].as_str())
        .collect();
    assert_eq!(palette, vec!["#4ade80", "#fbbf24", "#f87171", "#1e293b"]);
}

#[test]
fn test_two_section_report_uses_first_two_colors() {
    let text = "❶學習態度⭐⭐⭐☆☆ (60.0分)\n普通\n❷學習成效⭐⭐☆☆☆ (40.0分)\n✅ 答對：3題";
    let report = parse(text);
    assert_eq!(report.sections.len(), 2);

    let json = FlexSerializer::new().to_value(&render_report(text));
    let serialized = json.to_string();
    assert!(serialized.contains("#4ade80"));
    assert!(serialized.contains("#fbbf24"));
    assert!(!serialized.contains("#f87171"));
    // No advice, no advice card.
    assert!(!serialized.contains("#1e293b"));
}

#[test]
fn test_synthetic_sessions_always_render() {
    let mut rng = StdRng::seed_from_u64(99);

    for _ in 0..25 {
        let session = SessionGenerator::synthetic(&mut rng);
        let card = render_report(&compose(&session, "每天進步一點點"));

        assert!(matches!(card, CardNode::Bubble(_)));
        let outline = OutlineSerializer::new().outline(&card);
        assert!(outline.contains("每天進步一點點"));
        assert!(!build_prompt(&session).is_empty());
    }
}

#[test]
fn test_composed_report_is_delivered_as_card() {
    let text = compose(&scenario(), "加油");

    let OutboundMessage::Flex { alt_text, contents } = OutboundMessage::for_text(&text) else {
        panic!("composed report should become a flex card");
    };
    assert_eq!(alt_text, REPORT_ALT_TEXT);
    assert_eq!(contents, FlexSerializer::new().to_value(&render_report(&text)));
}

#[test]
fn test_multi_line_advice_renders_whole_in_advice_card() {
    let advice = "每天練習五題。\n✅ 複習錯題\n保持節奏！";
    let text = compose(&scenario(), &format!("  {advice}\n"));
    let report = parse(&text);

    assert_eq!(report.ai_advice, advice);
    assert_eq!(report.sections[2].stats.len(), 1);
    assert!(report.sections[2]
        .content
        .iter()
        .all(|line| !line.contains("保持節奏")));

    let json = FlexSerializer::new().to_value(&render_report(&text));
    let mut found = Vec::new();
    texts(&json, &mut found);
    assert!(found.contains(&advice.to_string()));
    assert!(!found.iter().any(|t| t == "✅ 複習錯題"));
}

#[test]
fn test_rendering_is_deterministic() {
    let report = parse(&compose(&scenario(), "加油"));
    let renderer = CardRenderer::new();
    assert_eq!(renderer.render(&report), renderer.render(&report));
}
