use ndarray::array;
use tracing_subscriber::EnvFilter;

use vsmat::{
    LocalMatrices, LoopbackDistributor, MatrixConfig, PatternMatrix, VariableSizeMatrix,
};

fn main() -> vsmat::MatrixResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("vsmat {}: variable-size sparse matrices over global ids", vsmat::VERSION);

    let config = MatrixConfig::default();
    println!("\nConfiguration:");
    println!("  Initial capacity: {}", config.initial_capacity);
    println!("  Assembly tolerance: {:e} ({:?})", config.tolerance, config.prune_stage);
    println!("  Threads: {}", config.system_params.n_threads);

    // Two subdomains sharing function 1
    let blocks = LocalMatrices::from_blocks(vec![
        array![[2.0, 0.5], [0.5, 1.0]],
        array![[1.0, 0.25], [0.25, 4.0]],
    ]);
    let global_indexes = vec![vec![Some(0), Some(1)], vec![Some(1), Some(2)]];

    let mut s = VariableSizeMatrix::from_config("S", &config);
    let summary = s.initialize_matrix_elements(&blocks, &global_indexes, 3, &config);
    println!("\nAssembled overlap matrix ({} inserted, {} dropped):", summary.inserted, summary.dropped);
    println!("{:?}", s);

    // Contributions a neighbor computed for row 2
    let mut neighbor = VariableSizeMatrix::new("S_neighbor", 1);
    neighbor.insert_new_row(2, &[2], &[0.5]);
    let mut distributor = LoopbackDistributor::from_peers([&neighbor]);
    s.consolidate(&[0, 1, 2], &mut distributor)?;

    println!("\nAfter consolidation:");
    s.write_csr(&mut std::io::stdout())?;
    println!("  trace = {}", s.trace());

    let pattern = PatternMatrix::from_matrix(&s);
    let mut s2 = VariableSizeMatrix::new("S2", s.n());
    s.amult_sym_b(&s, &mut s2, &pattern, true);

    println!("\nS*S restricted to the pattern of S:");
    s2.write_csr(&mut std::io::stdout())?;
    println!("  trace = {}", s2.trace());

    Ok(())
}
