use revtape::{
    available_backends, logic, BackendKind, FitnessParams, Gate, Maybe, OpRecord, RuntimeConfig,
    TapeRuntime, TAPE_CAPACITY,
};
use tracing_subscriber::EnvFilter;

fn main() {
    let args: Vec<String> = std::env::args().collect();
    init_tracing();
    print_banner();

    match args.get(1).map(String::as_str) {
        None | Some("demo")           => cli_demo(args.get(2).map(String::as_str)),
        Some("backends")              => cli_backends(),
        Some("help") | Some("--help") => print_help(),
        Some(unknown) => {
            eprintln!("Unknown command '{}'. Run 'revtape help' for usage.", unknown);
            std::process::exit(1);
        }
    }
}

/// `RUST_LOG=revtape=trace` shows every recorded, dropped and skipped op.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

// ── CLI ───────────────────────────────────────────────────────────────────

fn cli_demo(path: Option<&str>) {
    let config = match path {
        None => RuntimeConfig::new(4),
        Some(p) => {
            let json = match std::fs::read_to_string(p) {
                Ok(s) => s,
                Err(e) => { eprintln!("Cannot read '{}': {}", p, e); std::process::exit(1); }
            };
            match RuntimeConfig::from_json_str(&json) {
                Ok(c) => c,
                Err(e) => { eprintln!("{e}"); std::process::exit(1); }
            }
        }
    };

    if let Err(e) = run_all_demos(&config) {
        eprintln!("Demo failed: {e}");
        std::process::exit(1);
    }
}

fn cli_backends() {
    println!("Available backends:");
    for kind in BackendKind::ALL {
        let tag = if kind.is_quantum() { "quantum" } else { "classical" };
        println!("  {:<12} {}  [{tag}]", kind.to_string(), kind.name());
    }
    println!();
    println!("{} backend(s) compiled in: {}", available_backends().len(), available_backends().join(", "));
}

fn print_banner() {
    println!("╔══════════════════════════════════════════════╗");
    println!("║          revtape v0.1.0                      ║");
    println!("║  Reversible Tape-Loop Runtime                ║");
    println!("╚══════════════════════════════════════════════╝");
    println!();
}

fn print_help() {
    println!("USAGE:");
    println!("  revtape [demo] [config.json]   Run all demos (optional JSON config)");
    println!("  revtape backends               List state backends");
    println!("  revtape help                   Show this message\n");
    println!("CONFIG (all fields optional):");
    println!("  {{ \"cells\": 4, \"instance_id\": 0, \"backend\": \"classical\" | \"statevector\",");
    println!("    \"seed\": 42, \"fitness\": {{ \"recency_weight\": 0.5, \"activity_weight\": 0.3,");
    println!("    \"gate_weight\": 0.2, \"prune_interval\": 256, \"prune_threshold\": 0.75 }} }}\n");
    println!("PRIMITIVES (all self-inverse):");
    println!("  CCNOT a b c   Toffoli: c ^= a & b");
    println!("  CNOT  a b     b ^= a");
    println!("  NOT   a       a = !a");
    println!("  SWAP  a b     exchange a and b\n");
    println!("Set RUST_LOG=revtape=debug (or trace) for runtime logging.");
}

// ── Demos ─────────────────────────────────────────────────────────────────

fn run_all_demos(config: &RuntimeConfig) -> revtape::Result<()> {
    println!(
        "Backend: {} | cells: {} | instance: {}\n",
        config.backend, config.cells, config.instance_id
    );
    demo_basic_ops(config)?;
    demo_pruning(config)?;
    demo_self_modification(config)?;
    demo_meta_evolution(config)?;
    demo_time_travel(config)?;
    demo_derived_logic(config)?;
    Ok(())
}

fn print_cells(rt: &TapeRuntime) -> revtape::Result<()> {
    let mut line = String::new();
    for cell in 0..rt.num_cells() {
        line.push_str(&format!(" c{cell}={:.2}", rt.probability_one(cell)?));
    }
    println!("  P(1):{line}");
    Ok(())
}

fn demo_basic_ops(config: &RuntimeConfig) -> revtape::Result<()> {
    println!("━━━ Demo 1: Basic Operations ━━━━━━━━━━━━━━━━━━━━");
    if config.cells < 2 {
        println!("  (needs at least 2 cells)\n");
        return Ok(());
    }
    let mut rt = TapeRuntime::from_config(config)?;
    rt.not(0)?.cnot(0, 1)?.swap(0, 1)?;
    print_cells(&rt)?;
    for (i, slot) in rt.tape().iter().enumerate() {
        if let Some(op) = slot.record {
            println!("  tape[{i}] = {:<12} fitness {:.3}", op.to_string(), slot.fitness);
        }
    }
    println!("  total_ops={} head={}", rt.total_ops(), rt.tape_head());
    println!();
    Ok(())
}

fn demo_pruning(config: &RuntimeConfig) -> revtape::Result<()> {
    println!("━━━ Demo 2: Fitness-Driven Pruning ━━━━━━━━━━━━━━━");
    let mut rt = TapeRuntime::from_config(config)?;
    let cells = rt.num_cells();
    for i in 0..TAPE_CAPACITY + 200 {
        match i % 4 {
            0 => rt.not(i % cells)?,
            1 if cells > 1 => rt.cnot(i % cells, (i + 1) % cells)?,
            2 if cells > 2 => rt.ccnot(i % cells, (i + 1) % cells, (i + 2) % cells)?,
            _ if cells > 1 => rt.swap(i % cells, (i + 1) % cells)?,
            _ => rt.not(0)?,
        };
    }
    let stats = rt.stats();
    println!("  {} ops, wrapped={}, head={}", rt.total_ops(), rt.wrapped(), rt.tape_head());
    println!(
        "  active {}/{} | essential {} | fitness avg {:.3} min {:.3} max {:.3}",
        stats.active_count,
        rt.capacity(),
        stats.essential_count,
        stats.avg_fitness,
        stats.min_fitness,
        stats.max_fitness
    );
    println!("  pruning cycles: {} (last at op {})", stats.pruning_cycles, rt.last_prune_op());
    println!();
    Ok(())
}

fn demo_self_modification(config: &RuntimeConfig) -> revtape::Result<()> {
    println!("━━━ Demo 3: Self-Modification (code as data) ━━━━━━");
    let mut rt = TapeRuntime::from_config(config)?;
    rt.not(0)?.not(0)?.not(0)?;
    println!("  before: tape[1] = {:?}", rt.read_slot(1).map(|op| op.to_string()));
    if rt.num_cells() > 1 {
        rt.write_slot(1, OpRecord::cnot(0, 1));
    }
    rt.mark_essential(1);
    let slot = rt.slot(1);
    println!(
        "  after:  tape[1] = {:?} essential={} fitness={:.1}",
        slot.record.map(|op| op.to_string()),
        slot.essential,
        slot.fitness
    );
    println!("  total_ops unchanged: {}", rt.total_ops());
    println!();
    Ok(())
}

fn demo_meta_evolution(config: &RuntimeConfig) -> revtape::Result<()> {
    println!("━━━ Demo 4: Meta-Evolution ━━━━━━━━━━━━━━━━━━━━━━━");
    if config.cells < 2 {
        println!("  (needs at least 2 cells)\n");
        return Ok(());
    }
    let mut rt = TapeRuntime::from_config(config)?;
    for _ in 0..8 {
        rt.cnot(0, 1)?;
    }
    // rewrite every other CNOT into a SWAP over the same operands
    let rules: Vec<OpRecord> = (0..8).step_by(2).map(|i| OpRecord::patch_rule(i, Gate::Swap)).collect();
    let patched = rt.meta_modify(&rules)?;
    println!("  patched {patched} slot(s):");
    for i in 0..8 {
        if let Some(op) = rt.read_slot(i) {
            print!(" [{op}]");
        }
    }
    println!();

    let before = rt.fitness_params();
    rt.tune(FitnessParams::with_weights(1.0, 1.0, 2.0).with_prune(before.prune_interval, 0.5))?;
    let after = rt.fitness_params();
    println!(
        "  tuned weights: recency {:.2} activity {:.2} gate {:.2}, threshold {:.2}",
        after.recency_weight, after.activity_weight, after.gate_weight, after.prune_threshold
    );
    println!("  avg fitness now {:.3}", rt.stats().avg_fitness);
    println!();
    Ok(())
}

fn demo_time_travel(config: &RuntimeConfig) -> revtape::Result<()> {
    println!("━━━ Demo 5: Time Travel (checkpoint / restore) ━━━━");
    let mut rt = TapeRuntime::from_config(config)?;
    let cells = rt.num_cells();
    rt.not(0)?;
    let cp = rt.checkpoint()?;
    println!("  checkpoint at position {} (op {})", cp.position(), cp.op_index());
    print_cells(&rt)?;

    for i in 0..12 {
        if cells > 1 {
            rt.cnot(i % cells, (i + 1) % cells)?;
        }
        rt.not(i % cells)?;
    }
    println!("  after {} more ops:", rt.total_ops() - cp.op_index());
    print_cells(&rt)?;

    rt.restore(&cp)?;
    println!("  restored to op {}:", rt.total_ops());
    print_cells(&rt)?;

    let mut branch = rt.fork();
    branch.not(0)?;
    println!(
        "  forked branch: c0 {:.2} (original stays {:.2})",
        branch.probability_one(0)?,
        rt.probability_one(0)?
    );
    println!();
    Ok(())
}

fn demo_derived_logic(config: &RuntimeConfig) -> revtape::Result<()> {
    println!("━━━ Demo 6: Derived Logic Gates ━━━━━━━━━━━━━━━━━━━");
    if config.cells < 3 {
        println!("  (needs at least 3 cells)\n");
        return Ok(());
    }
    let gates: [(&str, fn(&mut TapeRuntime, usize, usize, usize) -> revtape::Result<()>); 5] = [
        ("AND", logic::and),
        ("OR", logic::or),
        ("XOR", logic::xor),
        ("NAND", logic::nand),
        ("NOR", logic::nor),
    ];
    println!("  a b | AND OR XOR NAND NOR");
    for (a, b) in [(false, false), (false, true), (true, false), (true, true)] {
        let mut row = Vec::new();
        for (_, gate) in &gates {
            let mut rt = TapeRuntime::from_config(config)?;
            if a { rt.not(0)?; }
            if b { rt.not(1)?; }
            gate(&mut rt, 0, 1, 2)?;
            row.push(rt.read(2)? as u8);
        }
        println!(
            "  {} {} |  {}   {}   {}    {}    {}",
            a as u8, b as u8, row[0], row[1], row[2], row[3], row[4]
        );
    }

    // third truth value: a condition decided outside the runtime
    let mut rt = TapeRuntime::from_config(config)?;
    let mut auth = Maybe::new("user_authenticated");
    let pending = Maybe::new("network_reachable");
    auth.resolve(true, 0.95, Some("session token valid"));
    for m in [&auth, &pending] {
        match m.load(&mut rt, 0)? {
            Some(_) => println!("  {m} -> c0 = {}", rt.read(0)? as u8),
            None => println!("  {m} -> left unloaded"),
        }
    }
    println!();
    Ok(())
}
