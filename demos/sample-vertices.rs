// Copyright 2017-2018 Peter Williams <peter@newton.cx> and collaborators
// Licensed under the GPL version 3.

/// Sample vertex offsets for a statically configured beam and print them.
///
/// The output is tab-separated `x y z ct`, in millimetres, one vertex per
/// line, which is easy to histogram when checking a configuration.

use betavtx::{BeamConfig, BetafuncVertexGenerator};
use clap::{crate_version, Arg, Command};
use std::process;

fn main() {
    let cmd = Command::new("sample-vertices")
        .version(crate_version!())
        .about("Sample beta-function vertex offsets")
        .arg(Arg::new("COUNT")
             .help("The number of vertices to sample")
             .required(true)
             .index(1))
        .arg(Arg::new("seed")
             .long("seed")
             .help("Seed for the random engine")
             .default_value("1"));
    let matches = BeamConfig::add_args(cmd).get_matches();

    let log = betavtx_test_support::default_log();

    let count = matches.get_one::<String>("COUNT").unwrap().parse::<usize>().unwrap_or_else(|e| {
        eprintln!("error: COUNT must be a non-negative integer: {}", e);
        process::exit(1);
    });
    let seed = matches.get_one::<String>("seed").unwrap().parse::<u64>().unwrap_or_else(|e| {
        eprintln!("error: seed must be a non-negative integer: {}", e);
        process::exit(1);
    });

    let gen = BeamConfig::from_matches(&matches)
        .and_then(|cfg| BetafuncVertexGenerator::new(&cfg, log))
        .unwrap_or_else(|e| {
            eprintln!("error: {}", e);
            process::exit(1);
        });

    let mut rng = betavtx_test_support::seeded_rng(seed);

    println!("x(mm)\ty(mm)\tz(mm)\tct(mm)");

    for _ in 0..count {
        let v = gen.vertex_shift(&mut rng).unwrap_or_else(|e| {
            eprintln!("error: {}", e);
            process::exit(1);
        });
        println!("{:.9e}\t{:.9e}\t{:.9e}\t{:.9e}", v.x, v.y, v.z, v.t);
    }
}
