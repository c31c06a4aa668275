// Copyright 2017-2018 Peter Williams <peter@newton.cx> and collaborators
// Licensed under the GPL version 3.

/*! Static configuration.

The option names and units follow the conventional beam spot configuration
blocks: lengths in centimetres, angles in radians, the time offset in
nanoseconds. Every numeric option defaults to zero, which on its own is
*not* a usable configuration, since `SigmaZ` and `BetaStar` must be set.

*/

use std::ffi::OsString;

use clap::{Arg, ArgAction, ArgMatches, Command};

use crate::errors::{Error, Result};


/// The configuration options of the beta-function vertex generator.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BeamConfig {
    /// `X0`: nominal x of the interaction point, in cm.
    pub x0: f64,

    /// `Y0`: nominal y of the interaction point, in cm.
    pub y0: f64,

    /// `Z0`: nominal z of the interaction point, in cm.
    pub z0: f64,

    /// `SigmaZ`: longitudinal width, in cm.
    pub sigma_z: f64,

    /// `BetaStar`: beta function at the waist, in cm.
    pub beta_star: f64,

    /// `Emittance`: non-normalized emittance, in cm.
    pub emittance: f64,

    /// `Alpha`: angle of the crossing plane, in radians.
    pub alpha: f64,

    /// `Phi`: half crossing angle, in radians.
    pub phi: f64,

    /// `TimeOffset`: in ns.
    pub time_offset: f64,

    /// `readDB`: take the beam parameters from the conditions database
    /// instead of from this configuration.
    pub read_db: bool,
}

impl Default for BeamConfig {
    fn default() -> Self {
        BeamConfig {
            x0: 0.,
            y0: 0.,
            z0: 0.,
            sigma_z: 0.,
            beta_star: 0.,
            emittance: 0.,
            alpha: 0.,
            phi: 0.,
            time_offset: 0.,
            read_db: false,
        }
    }
}


// (argument id, configuration name, help text)
const NUMERIC_OPTIONS: &[(&str, &str, &str)] = &[
    ("x0", "X0", "Nominal x of the interaction point, in cm"),
    ("y0", "Y0", "Nominal y of the interaction point, in cm"),
    ("z0", "Z0", "Nominal z of the interaction point, in cm"),
    ("sigma-z", "SigmaZ", "Longitudinal beam spot width, in cm"),
    ("beta-star", "BetaStar", "Beta function at the waist, in cm"),
    ("emittance", "Emittance", "Non-normalized beam emittance, in cm"),
    ("alpha", "Alpha", "Angle of the crossing plane with respect to x, in radians"),
    ("phi", "Phi", "Half crossing angle, in radians"),
    ("time-offset", "TimeOffset", "Time offset of the collisions, in ns"),
];


impl BeamConfig {
    /// Add the beam configuration options to a `clap` command.
    pub fn add_args(cmd: Command) -> Command {
        let cmd = NUMERIC_OPTIONS.iter().fold(cmd, |cmd, &(id, _, help)| {
            cmd.arg(Arg::new(id)
                    .long(id)
                    .value_name("VALUE")
                    .help(help)
                    .allow_negative_numbers(true)
                    .default_value("0"))
        });

        cmd.arg(Arg::new("read-db")
                .long("read-db")
                .help("Take beam parameters from the conditions database")
                .action(ArgAction::SetTrue))
    }

    /// Build a configuration from parsed arguments.
    ///
    /// The command must have been set up with `add_args`.
    pub fn from_matches(matches: &ArgMatches) -> Result<Self> {
        let get = |id: &str| -> Result<f64> {
            let name = NUMERIC_OPTIONS.iter()
                .find(|o| o.0 == id)
                .map(|o| o.1)
                .unwrap_or(id);

            let text = matches.get_one::<String>(id).ok_or_else(|| Error::InvalidOption {
                name: name.to_owned(),
                reason: "missing value".to_owned(),
            })?;

            parse_number(name, text)
        };

        Ok(BeamConfig {
            x0: get("x0")?,
            y0: get("y0")?,
            z0: get("z0")?,
            sigma_z: get("sigma-z")?,
            beta_star: get("beta-star")?,
            emittance: get("emittance")?,
            alpha: get("alpha")?,
            phi: get("phi")?,
            time_offset: get("time-offset")?,
            read_db: matches.get_flag("read-db"),
        })
    }

    /// Parse a command line that carries nothing but the beam options.
    pub fn from_args<I, T>(args: I) -> Result<Self>
        where I: IntoIterator<Item = T>, T: Into<OsString> + Clone
    {
        let cmd = BeamConfig::add_args(Command::new("beam-config").no_binary_name(true));
        let matches = cmd.try_get_matches_from(args).map_err(|e| Error::InvalidOption {
            name: "command line".to_owned(),
            reason: e.to_string().trim().to_owned(),
        })?;
        BeamConfig::from_matches(&matches)
    }
}


fn parse_number(name: &str, text: &str) -> Result<f64> {
    let v = text.trim().parse::<f64>().map_err(|e| Error::InvalidOption {
        name: name.to_owned(),
        reason: format!("{:?} is not a number: {}", text, e),
    })?;

    if !v.is_finite() {
        return Err(Error::InvalidOption {
            name: name.to_owned(),
            reason: format!("{:?} is not finite", text),
        });
    }

    Ok(v)
}


#[cfg(test)]
mod tests {
    use super::BeamConfig;
    use crate::errors::Error;

    #[test]
    fn defaults() {
        let cfg = BeamConfig::from_args(Vec::<String>::new()).unwrap();
        assert_eq!(cfg, BeamConfig::default());
    }

    #[test]
    fn all_options() {
        let cfg = BeamConfig::from_args(vec![
            "--x0", "0.0322", "--y0", "-0.1", "--z0", "0.5",
            "--sigma-z", "5.3", "--beta-star", "30", "--emittance", "1.986e-8",
            "--alpha", "0", "--phi", "142.5e-6", "--time-offset", "-2", "--read-db",
        ]).unwrap();

        assert_eq!(cfg.x0, 0.0322);
        assert_eq!(cfg.y0, -0.1);
        assert_eq!(cfg.sigma_z, 5.3);
        assert_eq!(cfg.emittance, 1.986e-8);
        assert_eq!(cfg.phi, 142.5e-6);
        assert_eq!(cfg.time_offset, -2.);
        assert!(cfg.read_db);
    }

    #[test]
    fn bad_number() {
        match BeamConfig::from_args(vec!["--sigma-z", "wide"]) {
            Err(Error::InvalidOption { name, .. }) => assert_eq!(name, "SigmaZ"),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn infinite_number() {
        assert!(BeamConfig::from_args(vec!["--beta-star", "inf"]).is_err());
    }

    #[test]
    fn unknown_option() {
        assert!(BeamConfig::from_args(vec!["--beta", "3"]).is_err());
    }
}
