use std::collections::HashMap;

use ragsweep::Settings;
use ragsweep::config::{DEFAULT_MAX_CHARS, DEFAULT_TOPK_LIST};

fn base_vars() -> HashMap<&'static str, &'static str> {
    HashMap::from([
        ("AOAI_ENDPOINT", "https://aoai.example.net"),
        ("AOAI_KEY", "aoai-key"),
        ("AOAI_DEPLOYMENT", "gpt-4o-mini"),
        ("AZ_SEARCH_ENDPOINT", "https://svc.search.windows.net"),
        ("AZ_SEARCH_KEY", "search-key"),
        ("INDEX_NAME", "docs-idx"),
    ])
}

fn load(vars: HashMap<&str, &str>) -> ragsweep::Result<Settings> {
    Settings::from_lookup(|name| vars.get(name).map(|v| v.to_string()))
}

#[test]
fn minimal_settings_with_defaults() {
    let settings = load(base_vars()).unwrap();

    assert_eq!(settings.aoai_endpoint, "https://aoai.example.net");
    assert_eq!(settings.deployment, "gpt-4o-mini");
    assert_eq!(settings.api_version, "2024-07-18");
    assert_eq!(settings.index, "docs-idx");
    assert!(!settings.use_semantic);
    assert_eq!(settings.max_chars, DEFAULT_MAX_CHARS);
    assert_eq!(settings.topk_list, DEFAULT_TOPK_LIST.to_vec());
    assert_eq!(settings.input_price_per_1k, 0.0);
    assert_eq!(settings.output_price_per_1k, 0.0);
    assert_eq!(settings.results_csv.to_str(), Some("results.csv"));
    assert_eq!(settings.answers_jsonl.to_str(), Some("answers.jsonl"));
}

#[test]
fn missing_required_variables_all_named_at_once() {
    let err = load(HashMap::new()).unwrap_err();
    let text = err.to_string();
    for name in [
        "AOAI_ENDPOINT",
        "AOAI_KEY",
        "AOAI_DEPLOYMENT",
        "AZ_SEARCH_ENDPOINT",
        "AZ_SEARCH_KEY",
        "INDEX_NAME",
    ] {
        assert!(text.contains(name), "error should name {name}: {text}");
    }
}

#[test]
fn partial_config_names_only_the_missing() {
    let mut vars = base_vars();
    vars.remove("AOAI_KEY");
    vars.remove("INDEX_NAME");

    let text = load(vars).unwrap_err().to_string();
    assert!(text.contains("AOAI_KEY"));
    assert!(text.contains("INDEX_NAME"));
    assert!(!text.contains("AOAI_ENDPOINT"));
}

#[test]
fn azure_prefixed_aliases_are_accepted() {
    let vars = HashMap::from([
        ("AZURE_OPENAI_ENDPOINT", "aoai.example.net"),
        ("AZURE_OPENAI_KEY", "aoai-key"),
        ("AZURE_OPENAI_DEPLOYMENT", "gpt-4o-mini"),
        ("AZURE_SEARCH_ENDPOINT", "svc.search.windows.net/"),
        ("AZURE_SEARCH_KEY", "search-key"),
        ("AZ_SEARCH_INDEX", "docs-idx"),
    ]);
    let settings = load(vars).unwrap();

    // Endpoints normalized: scheme added, trailing slash trimmed.
    assert_eq!(settings.aoai_endpoint, "https://aoai.example.net");
    assert_eq!(settings.search_endpoint, "https://svc.search.windows.net");
    assert_eq!(settings.index, "docs-idx");
}

#[test]
fn canonical_name_wins_over_alias() {
    let mut vars = base_vars();
    vars.insert("AZURE_OPENAI_DEPLOYMENT", "should-lose");
    let settings = load(vars).unwrap();
    assert_eq!(settings.deployment, "gpt-4o-mini");
}

#[test]
fn semantic_toggle_truthy_parse() {
    for (value, expected) in [
        ("1", true),
        ("true", true),
        ("Yes", true),
        ("ON", true),
        ("0", false),
        ("false", false),
        ("anything", false),
    ] {
        let mut vars = base_vars();
        vars.insert("USE_SEMANTIC", value);
        let settings = load(vars).unwrap();
        assert_eq!(settings.use_semantic, expected, "USE_SEMANTIC={value}");
    }
}

#[test]
fn topk_list_parses_and_skips_blanks() {
    let mut vars = base_vars();
    vars.insert("TOPK_LIST", "1,,3, 10");
    let settings = load(vars).unwrap();
    assert_eq!(settings.topk_list, vec![1, 3, 10]);
}

#[test]
fn topk_falls_back_to_short_alias() {
    let mut vars = base_vars();
    vars.insert("TOPK", "7");
    let settings = load(vars).unwrap();
    assert_eq!(settings.topk_list, vec![7]);
}

#[test]
fn bad_topk_entry_is_a_configuration_error() {
    let mut vars = base_vars();
    vars.insert("TOPK_LIST", "1,two,3");
    let text = load(vars).unwrap_err().to_string();
    assert!(text.contains("two"));
}

#[test]
fn bad_max_chars_names_the_variable() {
    let mut vars = base_vars();
    vars.insert("MAX_CHARS", "lots");
    let text = load(vars).unwrap_err().to_string();
    assert!(text.contains("MAX_CHARS"));
}

#[test]
fn prices_parse_and_bad_price_errors() {
    let mut vars = base_vars();
    vars.insert("INPUT_PRICE_PER1K", "0.015");
    vars.insert("OUTPUT_PRICE_PER1K", "0.06");
    let settings = load(vars).unwrap();
    assert_eq!(settings.input_price_per_1k, 0.015);
    assert_eq!(settings.output_price_per_1k, 0.06);

    let mut vars = base_vars();
    vars.insert("INPUT_PRICE_PER1K", "free");
    let text = load(vars).unwrap_err().to_string();
    assert!(text.contains("INPUT_PRICE_PER1K"));
}

#[test]
fn blank_values_count_as_missing() {
    let mut vars = base_vars();
    vars.insert("AOAI_KEY", "   ");
    let text = load(vars).unwrap_err().to_string();
    assert!(text.contains("AOAI_KEY"));
}
