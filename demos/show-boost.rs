// Copyright 2017-2018 Peter Williams <peter@newton.cx> and collaborators
// Licensed under the GPL version 3.

/// Print the crossing-angle boost and its inverse for some angles.

use betavtx::BoostMatrix;
use clap::{crate_version, Arg, ArgMatches, Command};
use std::process;

fn main() {
    let matches = Command::new("show-boost")
        .version(crate_version!())
        .about("Print the forward and inverse crossing-angle boosts")
        .arg(Arg::new("ALPHA")
             .help("Angle of the crossing plane, in radians")
             .required(true)
             .allow_negative_numbers(true)
             .index(1))
        .arg(Arg::new("PHI")
             .help("Half crossing angle, in radians")
             .required(true)
             .allow_negative_numbers(true)
             .index(2))
        .get_matches();

    let alpha = parse_angle(&matches, "ALPHA");
    let phi = parse_angle(&matches, "PHI");

    let (fwd, inv) = BoostMatrix::forward(alpha, phi)
        .and_then(|fwd| fwd.inverse().map(|inv| (fwd, inv)))
        .unwrap_or_else(|e| {
            eprintln!("error: {}", e);
            process::exit(1);
        });

    println!("forward:\n{}\n", fwd);
    println!("inverse:\n{}\n", inv);
    println!("max |forward * inverse - 1|: {:.3e}", (&fwd * &inv).max_abs_diff(&BoostMatrix::identity()));
}


fn parse_angle(matches: &ArgMatches, name: &str) -> f64 {
    let text = matches.get_one::<String>(name).map(|s| s.as_str()).unwrap_or("");

    text.parse::<f64>().unwrap_or_else(|e| {
        eprintln!("error: {} must be a number: {}", name, e);
        process::exit(1);
    })
}
