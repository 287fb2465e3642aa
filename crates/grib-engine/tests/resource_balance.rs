//! Resource-balance test: across long randomized call sequences, including
//! induced engine failures, every claimed buffer and register must be
//! returned.

use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use grib_engine::{DecodeBackend, Engine, EngineError, WriteRequest};

/// Backend that fails on demand and verifies files are freed after each call.
struct FlakyBackend {
    rng: StdRng,
    failure_rate: f64,
    open: Vec<PathBuf>,
}

impl FlakyBackend {
    fn new(seed: u64, failure_rate: f64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            failure_rate,
            open: Vec::new(),
        }
    }

    fn touch(&mut self, file: &Path) -> Result<(), EngineError> {
        self.open.push(file.to_path_buf());
        if self.rng.gen_bool(self.failure_rate) {
            return Err(EngineError::Backend("induced failure".to_string()));
        }
        Ok(())
    }
}

impl DecodeBackend for FlakyBackend {
    fn scan_inventory(&mut self, file: &Path) -> Result<String, EngineError> {
        self.touch(file)?;
        Ok(String::new())
    }

    fn decode_batch(&mut self, file: &Path, offsets: &[u64]) -> Result<Vec<f32>, EngineError> {
        self.touch(file)?;
        Ok(vec![0.0; offsets.len() * 4])
    }

    fn read_raw(&mut self, file: &Path, _offset: u64) -> Result<Vec<u8>, EngineError> {
        self.touch(file)?;
        Ok(vec![0u8; 16])
    }

    fn write_message(&mut self, request: &WriteRequest) -> Result<(), EngineError> {
        self.touch(&request.template_file)?;
        self.touch(&request.file)
    }

    fn free_file(&mut self, file: &Path) {
        self.open.retain(|f| f != file);
    }
}

#[test]
fn randomized_sequences_never_leak_handles() {
    let engine = Engine::new(Box::new(FlakyBackend::new(42, 0.25)));
    let mut rng = StdRng::seed_from_u64(7);
    let files = [
        PathBuf::from("a.grib2"),
        PathBuf::from("b.grib2"),
        PathBuf::from("c.grib2"),
    ];

    for round in 0..1000 {
        let file = &files[rng.gen_range(0..files.len())];
        // Success or induced failure, the pools must come back empty.
        match rng.gen_range(0..4) {
            0 => {
                let _ = engine.scan_inventory(file);
            }
            1 => {
                let offsets: Vec<u64> = (0..rng.gen_range(1u64..8)).map(|i| i * 100).collect();
                let _ = engine.decode_batch(file, &offsets, 4);
            }
            2 => {
                let _ = engine.read_raw(file, rng.gen_range(0..10_000));
            }
            _ => {
                let request = WriteRequest {
                    file: file.clone(),
                    template_file: files[0].clone(),
                    template_offset: 0,
                    data: rng.gen_bool(0.5).then(|| vec![1.0, 2.0, 3.0, 4.0]),
                    ..Default::default()
                };
                let _ = engine.write_message(&request);
            }
        }

        assert_eq!(engine.buffers_in_use(), 0, "buffer leak at round {round}");
        assert_eq!(
            engine.registers_in_use(),
            0,
            "register leak at round {round}"
        );
    }
}
