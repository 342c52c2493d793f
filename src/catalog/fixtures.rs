use crate::{
    catalog::{FieldInfo, InMemoryCatalog},
    parser::ast::Identifier,
};

fn column(name: &str, unit: &str, ucd: &str) -> (Identifier, FieldInfo) {
    (Identifier::regular(name), FieldInfo::new(unit, ucd).with_type("real"))
}

fn key(name: &str) -> (Identifier, FieldInfo) {
    (Identifier::regular(name), FieldInfo::new("", "meta.id").with_type("integer"))
}

fn located(name: &str, unit: &str, ucd: &str, frame: &str) -> (Identifier, FieldInfo) {
    (Identifier::regular(name), FieldInfo::new(unit, ucd).with_stc(frame).with_type("double precision"))
}

fn geometry(name: &str, unit: &str, ucd: &str, sql_type: &str) -> (Identifier, FieldInfo) {
    (Identifier::regular(name), FieldInfo::new(unit, ucd).with_stc("ICRS").with_type(sql_type))
}

fn delimited(name: &str, unit: &str, ucd: &str) -> (Identifier, FieldInfo) {
    (Identifier::delimited(name), FieldInfo::new(unit, ucd).with_type("real"))
}

/// A small catalog shared by the analyzer, morph and compiler tests.
pub fn sample_catalog() -> InMemoryCatalog {
    InMemoryCatalog::new()
        .with_table("spatial", vec![
            located("dist", "m", "phys.distance", "FK4"),
            located("width", "m", "phys.dim", "ICRS"),
            located("height", "km", "phys.dim", "ICRS"),
            located("ra1", "deg", "pos.eq.ra", "ICRS"),
            located("ra2", "rad", "pos.eq.ra", "FK4"),
        ])
        .with_table("spatial2", vec![
            located("ra1", "deg", "pos.eq.ra;meta.main", "ICRS"),
            located("dec", "deg", "pos.eq.dec;meta.main", "ICRS"),
            located("dist", "m", "phys.distance", "FK4"),
        ])
        .with_table("misc", vec![
            column("mass", "kg", "phys.mass"),
            column("mag", "mag", "phot.mag"),
            column("speed", "km/s", "phys.veloc"),
        ])
        .with_table("quoted", vec![
            delimited("left-right", "bg", "mess"),
            delimited("inch\"ing", "fin", "imperial.mess"),
            delimited("plAin", "pc", "boring.stuff"),
            delimited("alllower", "km", "simple.case"),
        ])
        .with_table("geo", vec![
            geometry("pt", "deg,deg", "pos.eq", "spoint"),
            geometry("coverage", "", "pos.outline", "spoly"),
        ])
        .with_table("a", vec![
            key("id"),
            column("x", "m", "phys.size"),
        ])
        .with_table("b", vec![
            key("id"),
            column("y", "kg", "phys.mass"),
        ])
        .with_table("c", vec![
            column("z", "s", "time"),
            column("u", "m", ""),
        ])
        .with_table("d", vec![
            column("z", "s", "time"),
            column("v", "m", ""),
        ])
        .with_table("ppmx.data", vec![
            located("alphaFloat", "deg", "pos.eq.ra;meta.main", "ICRS"),
            located("deltaFloat", "deg", "pos.eq.dec;meta.main", "ICRS"),
            column("pmra", "deg/yr", "pos.pm;pos.eq.ra"),
            column("pmde", "deg/yr", "pos.pm;pos.eq.dec"),
        ])
}
