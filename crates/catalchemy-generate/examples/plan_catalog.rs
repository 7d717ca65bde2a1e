use std::env;

use catalchemy_generate::plan_catalog;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut args = env::args().skip(1);
    let mut totals = Vec::new();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--products" => {
                let value = args.next().ok_or("missing value for --products")?;
                totals.push(value.parse::<u64>()?);
            }
            other => totals.push(other.parse::<u64>()?),
        }
    }
    if totals.is_empty() {
        totals = vec![100, 1_000, 10_000];
    }

    for total in totals {
        let plan = plan_catalog(total)?;
        println!("{}", serde_json::to_string(&plan)?);
    }
    Ok(())
}
