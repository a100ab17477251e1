//! Human-readable labels for catalog parameters.

use crate::query::classify::ParameterSpec;

/// Descriptions of the standard catalog columns, keyed by lowercase name.
const KNOWN_COLUMNS: &[(&str, &str)] = &[
    ("pgc", "PGC catalog number"),
    ("objname", "Principal object name"),
    ("objtype", "Object type (G = galaxy, S = star, ...)"),
    ("al1950", "Right ascension 1950 (hours)"),
    ("de1950", "Declination 1950 (degrees)"),
    ("al2000", "Right ascension 2000 (hours)"),
    ("de2000", "Declination 2000 (degrees)"),
    ("l2", "Galactic longitude (degrees)"),
    ("b2", "Galactic latitude (degrees)"),
    ("sgl", "Supergalactic longitude (degrees)"),
    ("sgb", "Supergalactic latitude (degrees)"),
    ("type", "Morphological type"),
    ("bar", "Barred galaxy (B)"),
    ("ring", "Ringed galaxy (R)"),
    ("multiple", "Multiple galaxy (M)"),
    ("compactness", "Compact (C) or diffuse (D)"),
    ("t", "Morphological type code"),
    ("logd25", "Log of apparent diameter (d25 in 0.1 arcmin)"),
    ("logr25", "Log of axis ratio (major/minor)"),
    ("pa", "Major axis position angle (north-east)"),
    ("brief", "Mean effective surface brightness"),
    ("logdc", "Log of corrected apparent diameter (dc in 0.1 arcmin)"),
    ("bt", "Total B magnitude"),
    ("it", "Total I magnitude"),
    ("ut", "Total U magnitude"),
    ("vt", "Total V magnitude"),
    ("kt", "Total K magnitude"),
    ("ube", "Effective U-B color"),
    ("bve", "Effective B-V color"),
    ("ubtc", "Corrected total U-B color"),
    ("bvtc", "Corrected total B-V color"),
    ("vmaxg", "Apparent maximum rotation velocity of gas"),
    ("vmaxs", "Apparent maximum rotation velocity of stars"),
    ("vdis", "Central velocity dispersion"),
    ("vrot", "Maximum rotation velocity corrected for inclination"),
    ("vrad", "Heliocentric radial velocity (radio)"),
    ("vopt", "Heliocentric radial velocity (optical)"),
    ("v", "Mean heliocentric radial velocity"),
    ("vlg", "Radial velocity relative to the Local Group"),
    ("vgsr", "Radial velocity relative to the GSR"),
    ("vvir", "Radial velocity corrected for Virgo infall"),
    ("v3k", "Radial velocity relative to the CMB"),
    ("m21", "21-cm line flux in magnitudes"),
    ("mfir", "Far-infrared magnitude"),
    ("m21c", "Corrected 21-cm line flux in magnitudes"),
    ("hic", "21-cm index btc - m21c in magnitudes"),
    ("ag", "Galactic extinction in B"),
    ("ai", "Internal extinction due to inclination in B"),
    ("a21", "21-cm self-absorption"),
    ("incl", "Inclination between line of sight and polar axis"),
    ("btc", "Corrected total B magnitude"),
    ("itc", "Corrected total I magnitude"),
    ("mg2", "Central Lick Mg2 index"),
    ("logavmm", "Log of mean value"),
    ("modz", "Cosmological distance modulus (from vvir, LCDM)"),
    ("mod0", "Distance modulus from distance measurements"),
    ("mabs", "Absolute B magnitude"),
    ("modbest", "Best distance modulus (mod0 and modz combined)"),
    ("bri25", "Mean surface brightness within isophote 25"),
    ("numtype", "Numerical type"),
    ("hptr", "Pointer"),
    ("agnclass", "AGN activity class"),
    ("f_astrom", "Astrometric accuracy flag"),
    ("name", "Name"),
    ("id", "Identifier"),
    ("stage", "Hubble stage"),
    ("mtype", "Morphological type"),
    ("b", "Bar parameter"),
];

/// Name fragments mapped to a parameter family, checked in order.
const FAMILIES: &[(&[&str], &str)] = &[
    (&["mag", "bt", "vt", "ut", "it", "jt", "ht", "kt", "m21", "mfir"], "Magnitude"),
    (&["flux", "f_"], "Flux"),
    (&["lum", "l_"], "Luminosity"),
    (&["mass", "m_"], "Mass"),
    (&["vel", "v_", "w20", "w50", "vmax", "vrot", "vdis"], "Velocity"),
    (&["rad", "r_", "d25", "a25", "b25", "diameter"], "Radius/size"),
    (&["pa", "incl", "ellip", "angle"], "Geometric parameter"),
    (&["z", "redshift", "mod"], "Distance/redshift"),
    (&["temp", "teff"], "Temperature"),
    (&["metal", "feh", "oh", "mg2"], "Metallicity/spectral index"),
    (&["age", "tau"], "Age"),
    (&["sfr"], "Star formation rate"),
    (&["dens", "n_"], "Density"),
    (&["log"], "Logarithmic parameter"),
    (&["color", "ube", "bve", "ubtc", "bvtc"], "Color"),
    (&["brightness", "bri", "sb"], "Surface brightness"),
    (&["extinction", "ag", "ai", "a21"], "Extinction"),
    (&["coord", "ra", "dec", "l2", "b2", "sgl", "sgb"], "Coordinate"),
    (&["type", "bar", "ring", "multiple", "compact"], "Morphological parameter"),
    (&["flag"], "Flag"),
    (&["class", "agn"], "Classification"),
];

fn known(name: &str) -> Option<&'static str> {
    KNOWN_COLUMNS
        .iter()
        .find(|(key, _)| *key == name)
        .map(|(_, text)| *text)
}

/// Description of a single column name.
pub fn describe_column(column: &str) -> String {
    let lower = column.trim().to_lowercase();
    if let Some(text) = known(&lower) {
        return text.to_string();
    }
    if let Some(base) = lower.strip_prefix("e_") {
        return match known(base) {
            Some(text) => format!("Error of {}", lowercase_first(text)),
            None => format!("Error of parameter {base}"),
        };
    }
    if lower.contains("err") {
        return format!("Error of parameter {column}");
    }
    FAMILIES
        .iter()
        .find(|(fragments, _)| fragments.iter().any(|f| lower.contains(f)))
        .map(|(_, family)| format!("{family} ({column})"))
        .unwrap_or_else(|| format!("Parameter {column}"))
}

/// Label for any classified parameter.
pub fn describe(spec: &ParameterSpec) -> String {
    match spec {
        ParameterSpec::ColumnRef(column) => describe_column(column),
        ParameterSpec::Expression(e) => format!("Expression: {}", e.text()),
        ParameterSpec::Unrecognized(text) => format!("Unknown parameter: {text}"),
    }
}

fn lowercase_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::classify::classify;

    #[test]
    fn standard_columns() {
        assert_eq!(describe_column("bt"), "Total B magnitude");
        assert_eq!(describe_column(" LOGD25 "), "Log of apparent diameter (d25 in 0.1 arcmin)");
    }

    #[test]
    fn error_columns() {
        assert_eq!(describe_column("e_bt"), "Error of total B magnitude");
        assert_eq!(describe_column("e_foo"), "Error of parameter foo");
    }

    #[test]
    fn heuristic_families() {
        assert_eq!(describe_column("w50_corr"), "Velocity (w50_corr)");
        assert_eq!(describe_column("sfr"), "Star formation rate (sfr)");
        assert_eq!(describe_column("qqq"), "Parameter qqq");
    }

    #[test]
    fn expressions_and_unknowns() {
        let columns = vec!["bt".to_string(), "vt".to_string()];
        let spec = classify("bt - vt", &columns).unwrap();
        assert_eq!(describe(&spec), "Expression: bt - vt");
        let spec = classify("vt", &columns).unwrap();
        assert_eq!(describe(&spec), "Total V magnitude");
        let spec = classify("velocity", &columns).unwrap();
        assert_eq!(describe(&spec), "Unknown parameter: velocity");
    }
}
