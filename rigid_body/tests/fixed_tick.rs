//! Drives the full per-tick contract the way a fixed-timestep simulation
//! loop would: snapshot, four-stage Runge-Kutta integration against the
//! force/torque queries, commit, bounds refresh, then sub-frame
//! interpolation. Results are checked against closed-form solutions.

use approx::assert_abs_diff_eq;
use mass_properties::{Inertia, Mass};
use nalgebra::Vector3;
use rigid_body::prelude::*;
use rotations::prelude::*;

fn evaluate(state: &BodyState, t: f64) -> DerivativeBodyState {
    let t = TimeStep::new(t);
    DerivativeBodyState::new(
        state.linear_velocity(),
        state.force_at(t),
        state.spin(),
        state.torque_at(t),
    )
}

fn evaluate_after(
    state: &BodyState,
    t: f64,
    dt: f64,
    derivative: &DerivativeBodyState,
) -> DerivativeBodyState {
    let mut advanced = *state;
    advanced.step(TimeStep::new(dt), derivative).unwrap();
    evaluate(&advanced, t + dt)
}

/// One classical RK4 tick: stage derivatives a..d, then a single step with
/// the weighted combination committed as the new current state.
fn rk4_tick(body: &mut RigidBody<Obb>, t: f64, dt: f64) {
    body.snapshot_previous();
    let state = *body.current();

    let a = evaluate(&state, t);
    let b = evaluate_after(&state, t, dt / 2.0, &a);
    let c = evaluate_after(&state, t, dt / 2.0, &b);
    let d = evaluate_after(&state, t, dt, &c);

    let linear_velocity = (a.linear_velocity()
        + b.linear_velocity() * 2.0
        + c.linear_velocity() * 2.0
        + d.linear_velocity())
        / 6.0;
    let force = (a.force() + b.force() * 2.0 + c.force() * 2.0 + d.force()) / 6.0;
    let spin = (a.spin() + b.spin() * 2.0 + c.spin() * 2.0 + d.spin()) * (1.0 / 6.0);
    let torque = (a.torque() + b.torque() * 2.0 + c.torque() * 2.0 + d.torque()) / 6.0;
    let combined = DerivativeBodyState::new(linear_velocity, force, spin, torque);

    let mut next = state;
    next.step(TimeStep::new(dt), &combined).unwrap();
    body.replace_current(next).unwrap();
    body.refresh_bounds();
}

fn falling_body() -> RigidBody<Obb> {
    let bounds = Obb::new(
        Vector3::zeros(),
        Quaternion::IDENTITY,
        Vector3::new(0.5, 0.5, 0.5),
    );
    RigidBody::new(
        Vector3::zeros(),
        Quaternion::IDENTITY,
        Mass::new(2.0).unwrap(),
        Inertia::diagonal(2.0, 2.0, 2.0).unwrap(),
        bounds,
    )
    .unwrap()
}

#[test]
fn test_constant_force_matches_closed_form() {
    let mut body = falling_body();
    // weight of a 2 kg body under g = 9.8
    body.set_external_force(Vector3::new(0.0, -19.6, 0.0))
        .unwrap();

    let dt = 0.01;
    for i in 0..100 {
        rk4_tick(&mut body, i as f64 * dt, dt);
    }

    // p(t) = F t^2 / 2m, v(t) = F t / m; RK4 is exact on polynomials of
    // this degree, so only accumulated rounding remains
    let state = body.current();
    assert_abs_diff_eq!(state.position()[1], -4.9, epsilon = 1e-9);
    assert_abs_diff_eq!(state.linear_velocity()[1], -9.8, epsilon = 1e-9);
    assert_abs_diff_eq!(state.linear_momentum()[1], -19.6, epsilon = 1e-9);
    assert_abs_diff_eq!(state.position()[0], 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(state.position()[2], 0.0, epsilon = 1e-12);
}

#[test]
fn test_constant_torque_spin_up() {
    let mut body = falling_body();
    body.set_external_torque(Vector3::new(0.0, 0.0, 0.4))
        .unwrap();

    let dt = 0.01;
    for i in 0..100 {
        rk4_tick(&mut body, i as f64 * dt, dt);
    }

    // L(t) = tau t, w(t) = L / I; the accumulated angle is
    // theta(t) = tau t^2 / 2I = 0.1 rad at t = 1
    let state = body.current();
    assert_abs_diff_eq!(state.angular_momentum()[2], 0.4, epsilon = 1e-9);
    assert_abs_diff_eq!(state.angular_velocity()[2], 0.2, epsilon = 1e-9);
    assert_abs_diff_eq!(state.orientation().norm(), 1.0, epsilon = 1e-12);

    let half_angle: f64 = 0.05;
    assert_abs_diff_eq!(state.orientation().z, half_angle.sin(), epsilon = 1e-6);
    assert_abs_diff_eq!(state.orientation().w, half_angle.cos(), epsilon = 1e-6);
    assert_abs_diff_eq!(state.orientation().x, 0.0, epsilon = 1e-9);
    assert_abs_diff_eq!(state.orientation().y, 0.0, epsilon = 1e-9);
}

#[test]
fn test_bounds_track_integrated_pose() {
    let mut body = falling_body();
    body.set_linear_velocity(Vector3::new(3.0, 0.0, 0.0)).unwrap();

    rk4_tick(&mut body, 0.0, 0.1);

    assert_abs_diff_eq!(body.bounds().center[0], body.current().position()[0], epsilon = 1e-12);
    assert_abs_diff_eq!(body.bounds().center[0], 0.3, epsilon = 1e-9);
    assert_eq!(body.bounds().orientation, body.current().orientation());
}

#[test]
fn test_midtick_interpolation_blends_states() {
    let mut body = falling_body();
    body.set_linear_velocity(Vector3::new(4.0, 0.0, 0.0)).unwrap();

    rk4_tick(&mut body, 0.0, 0.5);

    body.set_interpolation_factor(0.5).unwrap();
    let blended = body.interpolated_state().unwrap();
    let expected =
        (body.previous().position()[0] + body.current().position()[0]) / 2.0;
    assert_abs_diff_eq!(blended.position()[0], expected, epsilon = 1e-12);
    // derived values come from the blended primaries
    assert_abs_diff_eq!(
        blended.linear_velocity()[0],
        blended.linear_momentum()[0] * body.current().inverse_mass().value(),
        epsilon = 1e-12
    );
}

#[test]
fn test_snapshot_keeps_previous_tick_state() {
    let mut body = falling_body();
    body.set_external_force(Vector3::new(0.0, -19.6, 0.0))
        .unwrap();

    rk4_tick(&mut body, 0.0, 0.1);
    let after_first = *body.current();
    rk4_tick(&mut body, 0.1, 0.1);

    assert_eq!(body.previous(), &after_first);
    assert!(body.current().position()[1] < body.previous().position()[1]);
}
