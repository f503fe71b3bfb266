use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Color;
use ratatui::widgets::Widget;

use super::*;
use crate::audio::testing::{FakePlatform, element};
use crate::audio::{AudioGraphService, BIN_COUNT};

#[test]
fn bars_split_the_width_evenly_in_bin_order() {
    let bars = layout_bars(&[0, 255, 51, 128], 100.0, 50.0);
    assert_eq!(bars.len(), 4);
    for (i, bar) in bars.iter().enumerate() {
        assert_eq!(bar.x, i as f64 * 25.0);
        assert_eq!(bar.width, 25.0);
    }
    assert_eq!(bars[0].height, 0.0);
    assert!((bars[1].height - 40.0).abs() < 1e-9);
    assert!((bars[2].height - 8.0).abs() < 1e-9);
}

#[test]
fn bars_for_degenerate_surfaces_are_empty() {
    assert!(layout_bars(&[], 10.0, 10.0).is_empty());
    assert!(layout_bars(&[10, 20], 0.0, 10.0).is_empty());
    assert!(layout_bars(&[10, 20], 10.0, 0.0).is_empty());
}

#[test]
fn gradient_runs_green_yellow_red_by_height() {
    let (r, g, _) = gradient_at(0.0);
    assert!(g > r);
    let (r, g, _) = gradient_at(0.5);
    assert!(r > 200 && g > 200);
    let (r, g, _) = gradient_at(1.0);
    assert!(r > g);
    assert_eq!(gradient_at(-3.0), gradient_at(0.0));
    assert_eq!(gradient_at(7.0), gradient_at(1.0));
}

#[test]
fn loop_samples_only_while_started() {
    let mut graph = AudioGraphService::new(FakePlatform::new());
    let mut vis = VisualizationLoop::new();

    assert!(!vis.on_frame(&mut graph));
    assert!(vis.frame().is_none());

    vis.start();
    assert!(vis.is_running());
    // Unbound graph: zero data is still a frame and the loop keeps going.
    assert!(vis.on_frame(&mut graph));
    assert_eq!(vis.frame(), Some(&[0u8; BIN_COUNT][..]));
    assert!(vis.on_frame(&mut graph));
    assert!(vis.is_running());
}

#[test]
fn stop_cancels_the_pending_ticket_and_clears_the_frame() {
    let mut graph = AudioGraphService::new(FakePlatform::new());
    let mut el = element("a", 0.5);
    graph.bind(&mut el).unwrap();

    let mut vis = VisualizationLoop::new();
    vis.start();
    vis.on_frame(&mut graph);
    let before = vis.generation();

    vis.stop();
    assert_eq!(vis.generation(), before + 1);
    assert!(!vis.is_running());
    assert!(vis.frame().is_none());

    // The stale ticket fires once more and is dropped without sampling.
    assert!(!vis.on_frame(&mut graph));
    assert!(vis.frame().is_none());
    assert!(!vis.on_frame(&mut graph));

    vis.start();
    assert!(vis.on_frame(&mut graph));
    assert!(vis.frame().is_some());
}

#[test]
fn start_twice_keeps_a_single_ticket() {
    let mut graph = AudioGraphService::new(FakePlatform::new());
    let mut vis = VisualizationLoop::new();
    vis.start();
    vis.start();
    let generation = vis.generation();
    assert!(vis.on_frame(&mut graph));
    assert_eq!(vis.generation(), generation);
}

#[test]
fn widget_draws_bars_from_the_bottom_with_row_colours() {
    let area = Rect::new(0, 0, 4, 5);
    let mut buf = Buffer::empty(area);
    SpectrumWidget::new(&[255, 0, 0, 255]).render(area, &mut buf);

    // Full scale reaches 0.8 * 5 = 4 rows.
    assert_eq!(buf[(0, 4)].symbol(), "█");
    assert_eq!(buf[(0, 1)].symbol(), "█");
    assert_eq!(buf[(0, 0)].symbol(), " ");
    assert_eq!(buf[(1, 4)].symbol(), " ");
    assert_eq!(buf[(3, 1)].symbol(), "█");

    let (r, g, b) = gradient_at(0.0);
    assert_eq!(buf[(0, 4)].fg, Color::Rgb(r, g, b));
    assert_ne!(buf[(0, 4)].fg, buf[(0, 1)].fg);
}

#[test]
fn widget_tolerates_an_empty_area() {
    let area = Rect::new(0, 0, 0, 0);
    let mut buf = Buffer::empty(area);
    SpectrumWidget::new(&[255; 8]).render(area, &mut buf);
}
