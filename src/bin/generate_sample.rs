use std::fs::File;
use std::io::{BufWriter, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        low + (high - low) * self.next_f64()
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

const NUMERIC: [&str; 10] = [
    "t", "bt", "vt", "ut", "logd25", "logr25", "vrad", "vrot", "incl", "mabs",
];
const MORPHOLOGY: [&str; 8] = ["E", "S0", "Sa", "Sb", "Sbc", "Sc", "Sd", "Irr"];
const CATALOGS: [&str; 4] = ["NGC", "UGC", "IC", "ESO"];

/// One synthetic galaxy. `None` is a missing measurement.
struct Galaxy {
    name: String,
    pgc: i64,
    morphology: &'static str,
    values: [Option<f64>; NUMERIC.len()],
}

fn galaxy(i: usize, rng: &mut SimpleRng) -> Galaxy {
    let t = rng.uniform(-5.0, 10.0).round();
    let bt = rng.gauss(14.0, 1.5);
    let bv = 0.9 - 0.05 * t + rng.gauss(0.0, 0.08);
    let vrad = rng.uniform(300.0, 12000.0);
    let logd25 = 1.6 - 0.12 * (bt - 14.0) + rng.gauss(0.0, 0.1);
    let incl = rng.uniform(10.0, 90.0);
    let vrot = (10f64.powf(0.8 * logd25 + 1.0) + rng.gauss(0.0, 15.0)).max(20.0);
    let modulus = 5.0 * (vrad / 70.0).log10() + 25.0;

    let mut values = [
        Some(t),
        Some(bt),
        Some(bt - bv),
        Some(bt + 0.3 + rng.gauss(0.0, 0.1)),
        Some(logd25),
        Some(rng.uniform(0.0, 0.9)),
        Some(vrad),
        Some(vrot),
        Some(incl),
        Some(bt - modulus),
    ];
    // sparse columns, as in a real compilation
    for (slot, p) in values.iter_mut().zip([0.05, 0.0, 0.2, 0.6, 0.05, 0.1, 0.1, 0.5, 0.2, 0.3]) {
        if rng.chance(p) {
            *slot = None;
        }
    }

    let name = match i % 37 {
        0 => "G".to_string(),
        18 => String::new(),
        _ => format!(
            "{}{:04}",
            CATALOGS[(rng.next_u64() % CATALOGS.len() as u64) as usize],
            1 + rng.next_u64() % 7000
        ),
    };
    let morphology = MORPHOLOGY[((t + 5.0) / 15.0 * (MORPHOLOGY.len() - 1) as f64).round() as usize];

    Galaxy {
        name,
        pgc: 1000 + 7 * i as i64,
        morphology,
        values,
    }
}

/// Render a value the way hand-edited exports do: comma decimals now and
/// then, the odd `...` placeholder.
fn dirty_cell(value: Option<f64>, rng: &mut SimpleRng) -> String {
    match value {
        None if rng.chance(0.3) => "...".to_string(),
        None if rng.chance(0.2) => " ".to_string(),
        None => String::new(),
        Some(v) if rng.chance(0.1) => format!("{v:.3}").replace('.', ","),
        Some(v) => format!("{v:.3}"),
    }
}

fn write_delimited(path: &str, galaxies: &[Galaxy], rng: &mut SimpleRng) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {path}"))?;
    let mut out = BufWriter::new(file);
    writeln!(out, "# synthetic galaxy catalog")?;
    writeln!(out, "objname;pgc;objtype;type;{}", NUMERIC.join(";"))?;
    for g in galaxies {
        let cells: Vec<String> = g.values.iter().map(|v| dirty_cell(*v, rng)).collect();
        writeln!(
            out,
            "{};{};G;{};{}",
            g.name,
            g.pgc,
            g.morphology,
            cells.join(";")
        )?;
    }
    out.flush()?;
    Ok(())
}

fn write_parquet(path: &str, galaxies: &[Galaxy]) -> Result<()> {
    let mut fields = vec![
        Field::new("objname", DataType::Utf8, true),
        Field::new("pgc", DataType::Int64, false),
        Field::new("objtype", DataType::Utf8, false),
        Field::new("type", DataType::Utf8, false),
    ];
    fields.extend(NUMERIC.iter().map(|n| Field::new(*n, DataType::Float64, true)));
    let schema = Arc::new(Schema::new(fields));

    let names = StringArray::from(
        galaxies
            .iter()
            .map(|g| (!g.name.is_empty()).then_some(g.name.as_str()))
            .collect::<Vec<_>>(),
    );
    let pgc = Int64Array::from(galaxies.iter().map(|g| g.pgc).collect::<Vec<_>>());
    let objtype = StringArray::from(vec!["G"; galaxies.len()]);
    let morphology = StringArray::from(galaxies.iter().map(|g| g.morphology).collect::<Vec<_>>());

    let mut columns: Vec<Arc<dyn arrow::array::Array>> = vec![
        Arc::new(names),
        Arc::new(pgc),
        Arc::new(objtype),
        Arc::new(morphology),
    ];
    for i in 0..NUMERIC.len() {
        let values = Float64Array::from(galaxies.iter().map(|g| g.values[i]).collect::<Vec<_>>());
        columns.push(Arc::new(values));
    }

    let batch = RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;
    let file = File::create(path).with_context(|| format!("creating {path}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let count: usize = std::env::args()
        .nth(1)
        .map(|a| a.parse())
        .transpose()
        .context("usage: generate_sample [COUNT]")?
        .unwrap_or(500);

    let mut rng = SimpleRng::new(42);
    let galaxies: Vec<Galaxy> = (0..count).map(|i| galaxy(i, &mut rng)).collect();

    write_delimited("sample_catalog.csv", &galaxies, &mut rng)?;
    write_parquet("sample_catalog.parquet", &galaxies)?;

    println!(
        "Wrote {count} galaxies ({} parameters each) to sample_catalog.csv and sample_catalog.parquet",
        NUMERIC.len()
    );
    Ok(())
}
