#[test]
fn renderer_wgsl_sources_parse_successfully() {
    let module = parse_wgsl("tile_quad.wgsl", include_str!("tile_quad.wgsl"));
    let mut entry_points: Vec<&str> = module
        .entry_points
        .iter()
        .map(|entry_point| entry_point.name.as_str())
        .collect();
    entry_points.sort_unstable();
    assert_eq!(entry_points, ["fs_solid", "fs_textured", "vs_main"]);
}

fn parse_wgsl(label: &str, source: &str) -> naga::Module {
    naga::front::wgsl::parse_str(source).unwrap_or_else(|error| {
        panic!(
            "WGSL parse failed for {label}: {}",
            error.emit_to_string(source)
        )
    })
}
