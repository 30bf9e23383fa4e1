use pf_materials::MaterialId;
use pf_project::{
    MaterialDef, ProjectError, RunParams, ValidationError, load_params, params_from_yaml_str,
    validate_params,
};
use std::path::PathBuf;

fn demo(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../demos")
        .join(name)
}

fn scenario_a() -> RunParams {
    load_params(&demo("scenario_a.yaml")).unwrap()
}

fn field_of(err: ValidationError) -> String {
    match err {
        ValidationError::InvalidValue { field, .. } => field,
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn demo_bundles_load_and_validate() {
    let a = scenario_a();
    assert_eq!(a.material, MaterialDef::Catalog(MaterialId::Steel));
    assert_eq!(a.torches.len(), 1);
    assert_eq!(a.solver.relaxation, 1.5);
    assert_eq!(a.time.max_steps, 100_000);

    let b = load_params(&demo("scenario_b.yaml")).unwrap();
    assert_eq!(b.torches.len(), 2);
    assert_eq!(b.solver.tolerance, 1e-12);
    assert_eq!(b.solver.max_iterations, 5000);
    assert_eq!(b.boundary.wall_emissivity, Some(0.5));

    let custom = load_params(&demo("custom_material.json")).unwrap();
    match &custom.material {
        MaterialDef::Custom(spec) => assert_eq!(spec.name, "bronze"),
        other => panic!("expected a custom material, got {other:?}"),
    }
    assert!(!custom.boundary.walls.top);
    assert_eq!(custom.torches[0].theta_rad, 0.0);
}

#[test]
fn yaml_round_trip_preserves_params() {
    let a = scenario_a();
    let text = serde_yaml::to_string(&a).unwrap();
    assert_eq!(params_from_yaml_str(&text).unwrap(), a);
}

#[test]
fn torch_outside_the_furnace_is_rejected() {
    let mut p = scenario_a();
    p.torches[0].r_m = 1.5;
    assert_eq!(field_of(validate_params(&p).unwrap_err()), "torches[0].r_m");
    let mut p = scenario_a();
    p.torches[0].z_m = -0.1;
    assert_eq!(field_of(validate_params(&p).unwrap_err()), "torches[0].z_m");
}

#[test]
fn first_problem_is_reported() {
    let mut p = scenario_a();
    p.furnace.radius_m = 0.0;
    p.time.dt_s = -1.0;
    assert_eq!(field_of(validate_params(&p).unwrap_err()), "furnace.radius_m");
}

#[test]
fn out_of_range_values_are_rejected() {
    let cases: Vec<(&str, Box<dyn Fn(&mut RunParams)>)> = vec![
        ("mesh.ntheta", Box::new(|p: &mut RunParams| p.mesh.ntheta = 0)),
        ("torches[0].efficiency", Box::new(|p: &mut RunParams| p.torches[0].efficiency = 1.2)),
        ("torches[0].sigma_m", Box::new(|p: &mut RunParams| p.torches[0].sigma_m = 0.0)),
        ("torches[0].power_w", Box::new(|p: &mut RunParams| p.torches[0].power_w = f64::NAN)),
        ("boundary.wall_emissivity", Box::new(|p: &mut RunParams| p.boundary.wall_emissivity = Some(1.5))),
        ("boundary.h_w_m2k", Box::new(|p: &mut RunParams| p.boundary.h_w_m2k = -2.0)),
        ("time.record_every", Box::new(|p: &mut RunParams| p.time.record_every = 0)),
        ("time.dt_s", Box::new(|p: &mut RunParams| p.time.max_steps = 10)),
        ("solver.relaxation", Box::new(|p: &mut RunParams| p.solver.relaxation = 2.0)),
        ("solver.relaxation", Box::new(|p: &mut RunParams| p.solver.relaxation = 1.0)),
        ("solver.max_picard_iterations", Box::new(|p: &mut RunParams| p.solver.max_picard_iterations = 0)),
        ("initial_temperature_k", Box::new(|p: &mut RunParams| p.initial_temperature_k = 4000.0)),
        ("initial_temperature_k", Box::new(|p: &mut RunParams| p.initial_temperature_k = 0.0)),
    ];
    for (field, mutate) in cases {
        let mut p = scenario_a();
        mutate(&mut p);
        assert_eq!(field_of(validate_params(&p).unwrap_err()), field);
    }
}

#[test]
fn invalid_custom_material_is_a_validation_error() {
    let mut p = scenario_a();
    let mut spec = MaterialId::Copper.spec();
    spec.melting_temperature_k = 3000.0;
    p.material = MaterialDef::Custom(spec);
    assert_eq!(field_of(validate_params(&p).unwrap_err()), "material.custom");
}

#[test]
fn newer_versions_are_refused() {
    let mut p = scenario_a();
    p.version = 7;
    assert_eq!(
        validate_params(&p),
        Err(ValidationError::UnsupportedVersion { version: 7 })
    );
}

#[test]
fn unknown_catalog_material_fails_to_parse() {
    let text = std::fs::read_to_string(demo("scenario_a.yaml"))
        .unwrap()
        .replace("catalog: steel", "catalog: unobtainium");
    assert!(matches!(
        params_from_yaml_str(&text),
        Err(ProjectError::Yaml(_))
    ));
}

#[test]
fn missing_file_is_an_io_error() {
    assert!(matches!(
        load_params(&demo("does_not_exist.yaml")),
        Err(ProjectError::Io(_))
    ));
}
