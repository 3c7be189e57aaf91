use census_scatter::render::RenderPhase;
use census_scatter::{
    Axis, Chart, ChartConfig, DataSource, FieldSelection, LoadOptions, RecordId,
    SelectionController, fit_selection, loader,
};

fn sample_chart() -> Chart {
    let source: DataSource = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data/census_sample.csv")
        .parse()
        .unwrap();
    let data = loader::load(&source, &LoadOptions::default()).unwrap();
    Chart::new(data, ChartConfig::default()).unwrap()
}

fn settled_targets(chart: &Chart) -> Vec<(RecordId, f64, f64)> {
    chart
        .marks()
        .into_iter()
        .map(|m| (m.id, m.target().x, m.target().y))
        .collect()
}

#[test]
fn first_render_enters_every_record_from_the_bottom() {
    let mut chart = sample_chart();
    let out = chart
        .render(&FieldSelection::new("Males", "Females"), 0.0)
        .unwrap();
    assert_eq!(out.phase, RenderPhase::Initial);
    assert_eq!(out.entered, 8);
    assert_eq!(out.updated, 0);

    let frame = chart.frame(0.0);
    assert_eq!(frame.marks.len(), 8);
    for m in &frame.marks {
        assert_eq!(m.state.y, 450.0);
        assert_eq!(m.state.opacity, 0.3);
        assert_eq!(m.radius, 10.0);
    }
    let x_title = frame.x_axis.as_ref().map(|a| a.title.as_str());
    let y_title = frame.y_axis.as_ref().map(|a| a.title.as_str());
    assert_eq!(x_title, Some("Males"));
    assert_eq!(y_title, Some("Females"));
}

#[test]
fn delays_follow_target_x() {
    let mut chart = sample_chart();
    chart
        .render(&FieldSelection::new("Males", "Females"), 0.0)
        .unwrap();
    let mut marks = chart.marks();
    marks.sort_by(|a, b| a.target().x.total_cmp(&b.target().x));
    for pair in marks.windows(2) {
        assert!(pair[0].delay_ms <= pair[1].delay_ms);
    }
    for m in &marks {
        assert!((m.delay_ms - m.target().x * 5.0).abs() < 1e-9);
    }
    // The leftmost mark is Sikkim's North District, the smallest by Males.
    assert_eq!(marks[0].label, "North District");
}

#[test]
fn rendering_the_same_selection_twice_is_idempotent() {
    let mut chart = sample_chart();
    let sel = FieldSelection::new("Males", "Females");
    chart.render(&sel, 0.0).unwrap();
    let first = settled_targets(&chart);
    let out = chart.render(&sel, 200.0).unwrap();
    assert_eq!(out.phase, RenderPhase::Update);
    assert_eq!(out.entered, 0);
    assert_eq!(out.updated, 8);
    assert_eq!(settled_targets(&chart), first);
}

#[test]
fn colors_are_stable_across_selections() {
    let mut chart = sample_chart();
    chart
        .render(&FieldSelection::new("Males", "Females"), 0.0)
        .unwrap();
    let before: Vec<_> = chart.marks().into_iter().map(|m| (m.id, m.color)).collect();
    chart
        .render(&FieldSelection::new("Persons", "Literate"), 100.0)
        .unwrap();
    for (id, color) in before {
        assert_eq!(chart.mark(id).map(|m| m.color), Some(color));
    }
    // Same state, same color.
    let goa: Vec<_> = chart
        .marks()
        .into_iter()
        .filter(|m| m.group == "Goa")
        .map(|m| m.color)
        .collect();
    assert_eq!(goa.len(), 2);
    assert_eq!(goa[0], goa[1]);
}

#[test]
fn swapping_fields_swaps_titles_and_moves_marks() {
    let mut chart = sample_chart();
    let mut controller =
        SelectionController::for_dataset(FieldSelection::new("Males", "Females"), chart.dataset());
    chart.render(controller.selection(), 0.0).unwrap();
    let before = settled_targets(&chart);
    let colors: Vec<_> = chart.marks().into_iter().map(|m| m.color).collect();

    let t = chart.settled_at();
    controller.apply(Axis::X, "Females", &mut chart, t).unwrap();
    let out = controller.apply(Axis::Y, "Males", &mut chart, t).unwrap();
    assert_eq!(out.selection, FieldSelection::new("Females", "Males"));
    assert_eq!(out.entered, 0);

    let frame = chart.frame(chart.settled_at());
    assert_eq!(frame.x_axis.map(|a| a.title), Some("Females".to_string()));
    assert_eq!(frame.y_axis.map(|a| a.title), Some("Males".to_string()));
    assert_eq!(frame.marks.len(), before.len());
    let after_colors: Vec<_> = chart.marks().into_iter().map(|m| m.color).collect();
    assert_eq!(after_colors, colors);
    assert_ne!(settled_targets(&chart), before);
}

#[test]
fn records_missing_a_value_fade_out_and_return() {
    let mut chart = sample_chart();
    chart
        .render(&FieldSelection::new("Males", "Females"), 0.0)
        .unwrap();
    let t = chart.settled_at();

    let out = chart
        .render(&FieldSelection::new("Males", "Literate"), t)
        .unwrap();
    assert_eq!(out.excluded, 1);
    assert_eq!(out.exited, 1);
    assert_eq!(out.updated, 7);
    let amritsar = RecordId(7);
    assert!(chart.mark(amritsar).is_some_and(|m| m.is_exiting()));

    // Coming back before the fade completes revives the same mark.
    let out = chart
        .render(&FieldSelection::new("Males", "Females"), t + 100.0)
        .unwrap();
    assert_eq!(out.entered, 0);
    assert_eq!(out.updated, 8);
    assert!(chart.mark(amritsar).is_some_and(|m| !m.is_exiting()));

    // Once faded and pruned, it re-enters.
    let t2 = chart.settled_at();
    chart
        .render(&FieldSelection::new("Males", "Literate"), t2)
        .unwrap();
    let done = chart.settled_at();
    assert_eq!(chart.frame(done).marks.len(), 7);
    assert_eq!(chart.prune(done), 1);
    assert!(chart.mark(amritsar).is_none());
    let out = chart
        .render(&FieldSelection::new("Males", "Females"), done)
        .unwrap();
    assert_eq!(out.entered, 1);
}

#[test]
fn a_failed_render_leaves_the_chart_unchanged() {
    let mut chart = sample_chart();
    chart
        .render(&FieldSelection::new("Males", "Females"), 0.0)
        .unwrap();
    let before = settled_targets(&chart);
    assert!(
        chart
            .render(&FieldSelection::new("Males", "Nope"), 10.0)
            .is_err()
    );
    assert_eq!(settled_targets(&chart), before);
    assert_eq!(
        chart.y_axis().map(|a| a.title.as_str()),
        Some("Females")
    );
}

#[test]
fn unknown_fields_are_rejected_by_the_controller() {
    let chart = sample_chart();
    let mut controller =
        SelectionController::for_dataset(FieldSelection::new("Males", "Females"), chart.dataset());
    assert!(controller.change(Axis::X, "State").is_err());
    assert_eq!(controller.selection().x_field, "Males");
    assert!(controller.change(Axis::X, "Persons").unwrap());
    assert!(!controller.change(Axis::X, "Persons").unwrap());
}

#[test]
fn datasets_without_the_configured_fields_fall_back_to_their_own() {
    let csv = "State,District,Persons,Literate\nGoa,North Goa,818008,650000\nGoa,South Goa,640537,520000\n";
    let data = loader::load_from_reader(csv.as_bytes(), &LoadOptions::default()).unwrap();
    let fields = data.numeric_fields();
    let configured = ChartConfig::default().initial_selection();
    assert!(!fields.contains(&configured.x_field));

    let selection = fit_selection([&configured], &fields).unwrap();
    assert_eq!(selection, FieldSelection::new("Persons", "Literate"));

    // Fresh chart.
    let mut fresh = Chart::new(data.clone(), ChartConfig::default()).unwrap();
    assert_eq!(fresh.render(&selection, 0.0).unwrap().entered, 2);

    // Reload over a chart that showed other fields: the two rows keep their marks.
    let mut chart = sample_chart();
    let old = FieldSelection::new("Males", "Females");
    chart.render(&old, 0.0).unwrap();
    let selection = fit_selection([&old, &configured], &fields).unwrap();
    chart.replace_dataset(data).unwrap();
    let out = chart.render(&selection, 100.0).unwrap();
    assert_eq!((out.entered, out.updated, out.exited), (0, 2, 6));
    let controller = SelectionController::new(selection, fields);
    assert_eq!(controller.fields(), ["Persons", "Literate"]);
}
