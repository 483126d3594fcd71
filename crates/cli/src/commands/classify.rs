//! `workmatch classify`: Identifier vs. descriptive verdict.

use workmatch_ranking::ScenarioClassifier;

pub fn run(text: &str, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let classifier = ScenarioClassifier::new();
    let analysis = classifier.analyze(text);
    let identifiers = classifier.extract_identifiers(text);

    if json {
        let out = serde_json::json!({
            "scenario": analysis.scenario,
            "confidence": analysis.confidence,
            "reason": analysis.reason,
            "identifiers": identifiers,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("Scenario:    {}", analysis.scenario);
    println!("Confidence:  {:.1}", analysis.confidence);
    println!("Reason:      {}", analysis.reason);
    if !identifiers.is_empty() {
        println!("Identifiers: {}", identifiers.join(", "));
    }
    Ok(())
}
