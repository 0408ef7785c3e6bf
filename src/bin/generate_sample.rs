use std::path::PathBuf;
use std::sync::Arc;

use arrow::array::{DictionaryArray, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Int32Type, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::file::metadata::KeyValue;
use parquet::file::properties::WriterProperties;

const CELL_TYPES: [&str; 8] = [
    "Adipocytes",
    "Endothelial_Cells",
    "Fibroblasts",
    "Immune_Cells",
    "Mesothelial_Cells",
    "Neuronal_Cells",
    "Pericytes",
    "SMCs",
];

const LR_PAIRS: [(&str, &str); 16] = [
    ("Lep", "Lepr"),
    ("Adipoq", "Adipor1"),
    ("Adipoq", "Adipor2"),
    ("Vegfa", "Kdr"),
    ("Vegfa", "Flt1"),
    ("Pdgfb", "Pdgfrb"),
    ("Cxcl12", "Cxcr4"),
    ("Tgfb1", "Tgfbr1_Tgfbr2"),
    ("Bmp4", "Bmpr1a_Bmpr2"),
    ("Col1a1", "Itga1_Itgb1"),
    ("Fn1", "Itga5_Itgb1"),
    ("Angpt1", "Tek"),
    ("Dll4", "Notch1"),
    ("Ccl2", "Ccr2"),
    ("Nrg1", "Erbb3"),
    ("Sema3a", "Nrp1_Plxna1"),
];

/// `(file stem, weight scale)`; high-fat and older animals signal harder.
const DATASETS: [(&str, f64); 8] = [
    ("pvat_8weeks_control_male", 1.0),
    ("pvat_8weeks_control_female", 0.95),
    ("pvat_8weeks_hf_male", 1.25),
    ("pvat_8weeks_hf_female", 1.15),
    ("pvat_24weeks_control_male", 1.05),
    ("pvat_24weeks_control_female", 1.0),
    ("pvat_24weeks_hf_male", 1.4),
    ("pvat_24weeks_hf_female", 1.3),
];

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

    /// Exponential draw with the given mean.
    fn exponential(&mut self, mean: f64) -> f64 {
        -mean * (1.0 - self.next_f64()).max(1e-15).ln()
    }
}

struct Columns {
    source: Vec<&'static str>,
    target: Vec<&'static str>,
    ligand: Vec<&'static str>,
    receptor: Vec<&'static str>,
    weight: Vec<f64>,
}

fn generate_interactions(rng: &mut SimpleRng, scale: f64) -> Columns {
    let mut cols = Columns {
        source: Vec::new(),
        target: Vec::new(),
        ligand: Vec::new(),
        receptor: Vec::new(),
        weight: Vec::new(),
    };

    for source in CELL_TYPES {
        for target in CELL_TYPES {
            for (ligand, receptor) in LR_PAIRS {
                // Roughly a third of the pairs are predicted for any cell-type pair.
                if rng.next_f64() > 0.35 {
                    continue;
                }
                cols.source.push(source);
                cols.target.push(target);
                cols.ligand.push(ligand);
                cols.receptor.push(receptor);
                cols.weight.push(rng.exponential(0.7) * scale);
            }
        }
    }
    cols
}

fn main() {
    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data"));
    std::fs::create_dir_all(&out_dir).expect("Failed to create output directory");

    let mut rng = SimpleRng::new(42);

    let schema = Arc::new(Schema::new(vec![
        Field::new_dictionary("source", DataType::Int32, DataType::Utf8, false),
        Field::new_dictionary("target", DataType::Int32, DataType::Utf8, false),
        Field::new("ligand_complex", DataType::Utf8, false),
        Field::new("receptor_complex", DataType::Utf8, false),
        Field::new("weight", DataType::Float64, false),
    ]));

    for (stem, scale) in DATASETS {
        let cols = generate_interactions(&mut rng, scale);
        let n_rows = cols.weight.len();

        let source: DictionaryArray<Int32Type> = cols.source.into_iter().collect();
        let target: DictionaryArray<Int32Type> = cols.target.into_iter().collect();
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(source),
                Arc::new(target),
                Arc::new(StringArray::from(cols.ligand)),
                Arc::new(StringArray::from(cols.receptor)),
                Arc::new(Float64Array::from(cols.weight)),
            ],
        )
        .expect("Failed to create RecordBatch");

        // Name the uns slot the table belongs to.
        let props = WriterProperties::builder()
            .set_key_value_metadata(Some(vec![KeyValue::new(
                "uns_key".to_string(),
                "nichenet_lr_res".to_string(),
            )]))
            .build();

        let output_path = out_dir.join(format!("{stem}.parquet"));
        let file = std::fs::File::create(&output_path).expect("Failed to create output file");
        let mut writer =
            ArrowWriter::try_new(file, schema.clone(), Some(props)).expect("Failed to create writer");
        writer.write(&batch).expect("Failed to write batch");
        writer.close().expect("Failed to close writer");

        println!("Wrote {n_rows} interactions to {}", output_path.display());
    }
}
