//! Builds a layout, rearranges it, saves it, then restores it into a fresh container.
//!
//! Run with `RUST_LOG=debug cargo run --example layout_roundtrip` to see what the restore skips.

use egui::{Pos2, Rect, Vec2};
use egui_section_dock::{
    ContentRegistry, DockContainer, DropArea, LayoutBuilder, Orientation, SplitDirection,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut registry = ContentRegistry::new();
    let mut contents = Vec::new();
    for (name, title) in [
        ("scene", "Scene"),
        ("hierarchy", "Hierarchy"),
        ("inspector", "Inspector"),
        ("console", "Console"),
        ("profiler", "Profiler"),
    ] {
        contents.push(registry.register(name, title)?);
    }
    let content = |name: &str| {
        registry
            .resolve(name)
            .ok_or_else(|| format!("unknown content {name:?}"))
    };

    let mut builder = LayoutBuilder::new();
    let dockspace = builder.add_node();
    let (left, main) = builder.split_node(dockspace, SplitDirection::Left, 0.2);
    let (bottom, center) = builder.split_node(main, SplitDirection::Down, 0.3);
    builder.dock_content(content("hierarchy")?, left);
    builder.dock_content(content("scene")?, center);
    builder.dock_content(content("console")?, bottom);

    let mut dock = DockContainer::with_tree(builder.finish(dockspace));
    println!("built:\n{}\n", dock.tree().summary());

    // The inspector goes to the right edge of the whole window, the profiler next to the console.
    let _inspector = dock.add_section_content(content("inspector")?, None, DropArea::OuterRight);
    let console = dock.tree().find_content(content("console")?.uid());
    let _profiler = dock.add_section_content(content("profiler")?, console, DropArea::Center);

    // Split the scene section and float the hierarchy.
    if let Some(scene) = dock.tree().find_content(content("scene")?.uid()) {
        let _empty = dock.split_sections(scene, None, Orientation::Vertical);
    }
    let geometry = Rect::from_min_size(Pos2::new(64.0, 64.0), Vec2::new(300.0, 500.0));
    let _floating = dock.float_content(&content("hierarchy")?, Some(geometry));
    println!("rearranged:\n{}\n", dock.tree().summary());

    let saved = dock.save_state();
    println!("saved {} bytes", saved.len());

    // Pretend the profiler plugin is gone in the next session.
    drop(dock);
    contents.retain(|c| c.unique_name() != "profiler");
    assert!(!registry.contains("profiler"));

    let mut restored = DockContainer::new();
    let report = restored.restore_state(&saved, &registry)?;
    println!("restored:\n{}", restored.tree().summary());
    for panel in restored.floating_panels() {
        println!("floating {:?} at {:?}", panel.content().unique_name(), panel.geometry());
    }
    println!("skipped: {:?}", report.skipped);

    println!("\npanels menu:");
    for entry in restored.content_entries() {
        let mark = if entry.visible { "x" } else { " " };
        println!("[{mark}] {} ({})", entry.title, entry.unique_name);
    }
    Ok(())
}
