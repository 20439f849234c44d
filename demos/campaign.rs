//! Coupon Campaign – Uplift Targeting on a Simulated Population
//! ============================================================
//! Simulate a randomized coupon experiment, fit a T-learner, score every
//! customer, compare the estimates with the hidden segments, and write the
//! scored population to CSV. The highest-uplift customer gets a personalized
//! email when `GROQ_API_KEY` is set and the `remote` feature is enabled.
//!
//! ```bash
//! RUST_LOG=info cargo run --release --example campaign -- [config.json] [output.csv]
//! ```

use conversion_uplift::causal::evaluation::{segment_summaries, ExperimentSummary};
use conversion_uplift::causal::metalearners::TLearner;
use conversion_uplift::causal::policy::TargetingPolicy;
use conversion_uplift::config::{ConfigIO, UpliftConfig};
use conversion_uplift::marketer::{CustomerProfile, EmailAgent};
use conversion_uplift::simulation::Simulator;
use conversion_uplift::GradientBooster;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::env;
use std::error::Error;

fn fmt_rate(v: Option<f64>) -> String {
    v.map(|x| format!("{:+.3}", x)).unwrap_or_else(|| "n/a".to_string())
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args: Vec<String> = env::args().collect();

    // ------------------------------------------------------------------
    // 1. Configuration
    // ------------------------------------------------------------------
    let cfg = match args.get(1) {
        Some(path) => UpliftConfig::load(path)?,
        None => UpliftConfig::default(),
    };
    cfg.validate()?;
    let output = args.get(2).map(String::as_str).unwrap_or("scored_customers.csv");

    // ------------------------------------------------------------------
    // 2. Simulate
    // ------------------------------------------------------------------
    let mut rng = StdRng::seed_from_u64(cfg.simulation.seed);
    let mut dataset = Simulator::from_config(&cfg.simulation)?.generate(&mut rng);
    let experiment = ExperimentSummary::from_dataset(&dataset);
    println!("Simulated {} customers.", dataset.len());
    println!(
        "Control:   {:>5} customers, conversion {}",
        experiment.control.records,
        fmt_rate(experiment.control.conversion_rate())
    );
    println!(
        "Treatment: {:>5} customers, conversion {}",
        experiment.treatment.records,
        fmt_rate(experiment.treatment.conversion_rate())
    );
    println!("Observed lift: {}", fmt_rate(experiment.observed_lift()));

    // ------------------------------------------------------------------
    // 3. Fit & score
    // ------------------------------------------------------------------
    let learner = TLearner::<GradientBooster>::from_config(cfg.booster.clone())?;
    let fitted = learner.fit(&dataset, &cfg.features)?;
    fitted.annotate(&mut dataset, &cfg.features)?;

    println!("\n{:<14} {:>7} {:>8} {:>9} {:>10}", "Segment", "Count", "True", "Observed", "Estimated");
    for s in segment_summaries(&dataset, None)? {
        println!(
            "{:<14} {:>7} {:>+8.3} {:>9} {:>10}",
            s.segment.to_string(),
            s.records,
            s.true_uplift,
            fmt_rate(s.observed_lift),
            fmt_rate(s.mean_estimated_uplift)
        );
    }

    // ------------------------------------------------------------------
    // 4. Target
    // ------------------------------------------------------------------
    let policy = TargetingPolicy::new(cfg.threshold)?;
    let targeted = policy.targeted(&dataset);
    println!("\nTargeting {} customers with uplift > {}.", targeted.len(), cfg.threshold);

    let scores = dataset.uplift_scores().unwrap_or(&[]);
    if let Some(lead) = policy.best_lead(scores) {
        let record = &dataset.records()[lead];
        println!("Best lead: #{} ({}, uplift {:+.3})", lead, record.segment, scores[lead]);
        let agent = EmailAgent::from_credential(env::var("GROQ_API_KEY").ok().as_deref());
        println!("{}", agent.write_email(&CustomerProfile::from(record)));
    }

    // ------------------------------------------------------------------
    // 5. Export
    // ------------------------------------------------------------------
    let mut writer = csv::Writer::from_path(output)?;
    writer.write_record([
        "recency",
        "frequency",
        "amount",
        "age",
        "income",
        "segment",
        "treatment",
        "conversion",
        "uplift_score",
    ])?;
    for (record, score) in dataset.iter().zip(scores) {
        writer.write_record([
            record.recency.to_string(),
            record.frequency.to_string(),
            record.amount.to_string(),
            record.age.to_string(),
            record.income.to_string(),
            record.segment.to_string(),
            (record.treatment as u8).to_string(),
            (record.conversion as u8).to_string(),
            score.to_string(),
        ])?;
    }
    writer.flush()?;
    println!("\nWrote scored population to {output}.");

    Ok(())
}
