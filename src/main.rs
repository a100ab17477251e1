use anyhow::{Context, Result};
use clap::Parser;

use galaxy_explorer::analysis::histogram::ValueRange;
use galaxy_explorer::analysis::stats::Summary;
use galaxy_explorer::cli::{object_heading, parse_range, Args};
use galaxy_explorer::describe::describe_column;
use galaxy_explorer::query::Catalog;
use galaxy_explorer::{ExplorerConfig, Session};

fn print_summary(label: &str, s: &Summary) {
    println!("{label}");
    println!("  values:  {}", s.count);
    println!("  mean:    {:.6} ± {:.6}", s.mean, s.std_dev);
    println!("  median:  {:.6}", s.median);
    println!("  min/max: {:.6} / {:.6}", s.min, s.max);
    println!("  Q1/Q3:   {:.6} / {:.6} (IQR {:.6})", s.q1, s.q3, s.iqr);
    match s.coefficient_of_variation {
        Some(cv) => println!("  CV:      {cv:.2}%"),
        None => println!("  CV:      undefined (mean is 0)"),
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => ExplorerConfig::from_path(path)?,
        None => ExplorerConfig::default(),
    };

    let catalog = Catalog::open(&args.path, &config)
        .with_context(|| format!("could not load {}", args.path.display()))?;
    let mut session = Session::new(&config);
    session.set_catalog(catalog);
    if let Some(range) = args.x_range.as_deref() {
        let (low, high) = parse_range(range).context("--x-range expects MIN,MAX")?;
        session.context.x_range = Some(ValueRange::new(low, high)?);
    }

    let catalog = session.catalog()?;
    println!("{}", args.path.display());
    println!(
        "{} objects, {} analyzable parameters",
        catalog.len(),
        catalog.parameters().len()
    );

    if args.list_parameters {
        for name in catalog.parameters() {
            println!("  {name:<12} {}", describe_column(name));
        }
        return Ok(());
    }

    if let Some(x) = args.x.as_deref() {
        println!();
        let summary = session.run(|c, _| c.summary(x))?;
        print_summary(&catalog.label(x), &summary);

        match session.run(|c, ctx| c.distribution(x, ctx)) {
            Ok(plot) => {
                let d = &plot.distribution;
                println!("  distribution: {} values in {} bins", d.summary.count, d.bins);
            }
            Err(e) => println!("  distribution: {e}"),
        }

        if let Some(y) = args.y.as_deref() {
            println!();
            let summary = session.run(|c, _| c.summary(y))?;
            print_summary(&catalog.label(y), &summary);

            println!();
            match session.run(|c, ctx| c.correlation(x, y, ctx)) {
                Ok(corr) => {
                    let fit = &corr.fit;
                    println!("Correlation ({} pairs)", fit.pairs);
                    println!("  r:         {:.6}", fit.r);
                    println!("  slope:     {:.6} ± {:.6}", fit.slope, fit.std_err);
                    println!("  intercept: {:.6}", fit.intercept);
                    println!("  R²:        {:.6}", fit.r_squared);
                    println!("  p-value:   {:.3e}", fit.p_value);
                }
                Err(e) => println!("Correlation: {e}"),
            }
        }
    }

    if let Some(designator) = args.object.as_deref() {
        println!();
        let picked = session.select(designator)?;
        println!("Object {}", object_heading(&picked, &config.naming));
        let parameters: Vec<String> = match (&args.x, &args.y) {
            (Some(x), Some(y)) => vec![x.clone(), y.clone()],
            (Some(x), None) => vec![x.clone()],
            _ => catalog.parameters().iter().take(10).cloned().collect(),
        };
        for parameter in &parameters {
            match catalog.object_profile(picked.id, parameter) {
                Ok(p) => println!(
                    "  {:<12} {:>12.6}  percentile {:5.1}%  mean {:.6}  median {:.6}  {:+.2}σ",
                    p.parameter, p.value, p.percentile, p.population.mean, p.population.median, p.z_score
                ),
                Err(e) => println!("  {parameter:<12} {e}"),
            }
        }
    }

    if let Some(term) = args.search.as_deref() {
        println!();
        let found = catalog.search(term);
        println!("{} match(es) for '{term}'", found.len());
        for name in found {
            println!("  {name}");
        }
    }

    Ok(())
}
