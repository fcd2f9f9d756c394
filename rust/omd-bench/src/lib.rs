//! omd-bench: criterion benchmarks live under `benches/`.
