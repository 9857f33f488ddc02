use frame_scene::{
    animation::Direction,
    scene::{SceneConfig, SlidingSquare},
};

#[test]
fn square_bounces_between_bounds() {
    let config = SceneConfig::default();
    let mut square = SlidingSquare::new(&config);

    let xs: Vec<f32> = (0..250).map(|_| square.advance()).collect();

    assert_eq!(xs[0], 1.0);
    assert_eq!(xs[49], 50.0);
    // Turned around at the top, back through zero, down to the bottom
    assert_eq!(xs[50], 49.0);
    assert_eq!(xs[99], 0.0);
    assert_eq!(xs[149], -50.0);
    assert_eq!(xs[150], -49.0);
    assert_eq!(xs[249], 50.0);
    assert_eq!(square.travel.direction(), Direction::Negative);
    assert!(xs.iter().all(|x| x.abs() <= config.square_bound));
}

#[test]
fn custom_step_and_bound() {
    let config = SceneConfig {
        square_step: 4.0,
        square_bound: 10.0,
        ..Default::default()
    };
    let mut square = SlidingSquare::new(&config);
    let xs: Vec<f32> = (0..6).map(|_| square.advance()).collect();
    assert_eq!(xs, vec![4.0, 8.0, 10.0, 6.0, 2.0, -2.0]);
}
