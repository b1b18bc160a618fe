//! Command parser: resolves relative, smooth, and arc commands into
//! absolute line and cubic segments.

use plate_types::Point2;

use crate::error::MalformedPathError;
use crate::lexer::Lexer;

/// An absolute path segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segment {
    MoveTo(Point2),
    LineTo(Point2),
    CubicTo { c1: Point2, c2: Point2, to: Point2 },
    QuadTo { c: Point2, to: Point2 },
    Close,
}

/// Operand count per command repetition.
fn arity(cmd: char) -> usize {
    match cmd.to_ascii_uppercase() {
        'M' | 'L' | 'T' => 2,
        'H' | 'V' => 1,
        'C' => 6,
        'S' | 'Q' => 4,
        'A' => 7,
        _ => 0,
    }
}

struct State {
    segments: Vec<Segment>,
    current: Point2,
    start: Point2,
    /// True between a move-to and the matching close-path.
    open: bool,
    last_cubic_ctrl: Option<Point2>,
    last_quad_ctrl: Option<Point2>,
}

impl State {
    fn new() -> Self {
        Self {
            segments: Vec::new(),
            current: [0.0, 0.0],
            start: [0.0, 0.0],
            open: false,
            last_cubic_ctrl: None,
            last_quad_ctrl: None,
        }
    }

    fn resolve(&self, relative: bool, p: Point2) -> Point2 {
        if relative {
            [self.current[0] + p[0], self.current[1] + p[1]]
        } else {
            p
        }
    }

    fn move_to(&mut self, p: Point2) {
        self.segments.push(Segment::MoveTo(p));
        self.current = p;
        self.start = p;
        self.open = true;
    }

    /// Drawing after a close-path continues from the closed subpath's
    /// start point as a new subpath.
    fn ensure_open(&mut self) {
        if !self.open {
            let p = self.current;
            self.move_to(p);
        }
    }

    fn line_to(&mut self, p: Point2) {
        self.ensure_open();
        self.segments.push(Segment::LineTo(p));
        self.current = p;
    }

    fn cubic_to(&mut self, c1: Point2, c2: Point2, to: Point2) {
        self.ensure_open();
        self.segments.push(Segment::CubicTo { c1, c2, to });
        self.current = to;
        self.last_cubic_ctrl = Some(c2);
    }

    fn quad_to(&mut self, c: Point2, to: Point2) {
        self.ensure_open();
        self.segments.push(Segment::QuadTo { c, to });
        self.current = to;
        self.last_quad_ctrl = Some(c);
    }
}

fn reflect(p: Point2, around: Point2) -> Point2 {
    [2.0 * around[0] - p[0], 2.0 * around[1] - p[1]]
}

/// Read one repetition of operands for `cmd`, reporting how many were
/// found when the stream runs short.
fn operands(
    lexer: &mut Lexer<'_>,
    cmd: char,
    offset: usize,
) -> Result<Vec<f64>, MalformedPathError> {
    let expected = arity(cmd);
    let is_arc = cmd.eq_ignore_ascii_case(&'a');
    let mut values = Vec::with_capacity(expected);
    for i in 0..expected {
        let short = MalformedPathError::MissingOperands {
            command: cmd,
            offset,
            expected,
            found: values.len(),
        };
        if is_arc && (i == 3 || i == 4) {
            if lexer.at_end() || lexer.command_ahead() {
                return Err(short);
            }
            values.push(if lexer.flag()? { 1.0 } else { 0.0 });
        } else {
            if !lexer.at_number() {
                return Err(short);
            }
            values.push(lexer.number()?);
        }
    }
    Ok(values)
}

/// Parse path data into absolute segments.
pub fn parse(src: &str) -> Result<Vec<Segment>, MalformedPathError> {
    let mut lexer = Lexer::new(src);
    let mut state = State::new();

    while !lexer.at_end() {
        let offset = lexer.offset();
        let cmd = match lexer.command() {
            Some(c) => c,
            None if lexer.at_number() => {
                return Err(MalformedPathError::OperandBeforeCommand {
                    offset: lexer.offset(),
                })
            }
            None => return Err(lexer.unexpected()),
        };
        let relative = cmd.is_ascii_lowercase();

        if cmd.eq_ignore_ascii_case(&'z') {
            if !state.open {
                return Err(MalformedPathError::CloseWithoutSubpath { offset });
            }
            state.segments.push(Segment::Close);
            state.current = state.start;
            state.open = false;
            state.last_cubic_ctrl = None;
            state.last_quad_ctrl = None;
            continue;
        }

        // Each command takes at least one repetition, then keeps going
        // while more numbers follow.
        let mut first = true;
        loop {
            let v = operands(&mut lexer, cmd, offset)?;
            let prev_cubic = state.last_cubic_ctrl.take();
            let prev_quad = state.last_quad_ctrl.take();

            match cmd.to_ascii_uppercase() {
                'M' => {
                    let p = state.resolve(relative, [v[0], v[1]]);
                    if first {
                        state.move_to(p);
                    } else {
                        state.line_to(p);
                    }
                }
                'L' => {
                    let p = state.resolve(relative, [v[0], v[1]]);
                    state.line_to(p);
                }
                'H' => {
                    let x = if relative { state.current[0] + v[0] } else { v[0] };
                    state.line_to([x, state.current[1]]);
                }
                'V' => {
                    let y = if relative { state.current[1] + v[0] } else { v[0] };
                    state.line_to([state.current[0], y]);
                }
                'C' => {
                    let c1 = state.resolve(relative, [v[0], v[1]]);
                    let c2 = state.resolve(relative, [v[2], v[3]]);
                    let to = state.resolve(relative, [v[4], v[5]]);
                    state.cubic_to(c1, c2, to);
                }
                'S' => {
                    let c1 = prev_cubic
                        .map(|c| reflect(c, state.current))
                        .unwrap_or(state.current);
                    let c2 = state.resolve(relative, [v[0], v[1]]);
                    let to = state.resolve(relative, [v[2], v[3]]);
                    state.cubic_to(c1, c2, to);
                }
                'Q' => {
                    let c = state.resolve(relative, [v[0], v[1]]);
                    let to = state.resolve(relative, [v[2], v[3]]);
                    state.quad_to(c, to);
                }
                'T' => {
                    let c = prev_quad
                        .map(|c| reflect(c, state.current))
                        .unwrap_or(state.current);
                    let to = state.resolve(relative, [v[0], v[1]]);
                    state.quad_to(c, to);
                }
                'A' => {
                    let from = state.current;
                    let to = state.resolve(relative, [v[5], v[6]]);
                    let cubics = arc_to_cubics(
                        from,
                        to,
                        [v[0], v[1]],
                        v[2],
                        v[3] != 0.0,
                        v[4] != 0.0,
                    );
                    if cubics.is_empty() {
                        // Zero radius: SVG draws a straight line.
                        state.line_to(to);
                    } else {
                        for (c1, c2, end) in cubics {
                            state.cubic_to(c1, c2, end);
                        }
                        // Arcs never feed smooth-curve reflection.
                        state.last_cubic_ctrl = None;
                    }
                }
                _ => return Err(lexer.unexpected()),
            }

            first = false;
            if !lexer.at_number() {
                break;
            }
        }
    }

    Ok(state.segments)
}

/// Convert an SVG elliptical arc into cubic Béziers of at most 90° each.
/// Returns an empty list when either radius is zero, and a single
/// degenerate segment when the endpoints coincide.
pub fn arc_to_cubics(
    from: Point2,
    to: Point2,
    radii: [f64; 2],
    x_axis_rotation: f64,
    large_arc: bool,
    sweep: bool,
) -> Vec<(Point2, Point2, Point2)> {
    let (mut rx, mut ry) = (radii[0].abs(), radii[1].abs());
    if rx < f64::EPSILON || ry < f64::EPSILON {
        return Vec::new();
    }
    if (from[0] - to[0]).abs() < f64::EPSILON && (from[1] - to[1]).abs() < f64::EPSILON {
        return vec![(from, to, to)];
    }

    let (sin_phi, cos_phi) = x_axis_rotation.to_radians().sin_cos();

    // Endpoint to centre parameterization (SVG implementation notes F.6.5).
    let dx2 = (from[0] - to[0]) / 2.0;
    let dy2 = (from[1] - to[1]) / 2.0;
    let x1p = cos_phi * dx2 + sin_phi * dy2;
    let y1p = -sin_phi * dx2 + cos_phi * dy2;

    let lambda = (x1p * x1p) / (rx * rx) + (y1p * y1p) / (ry * ry);
    if lambda > 1.0 {
        let s = lambda.sqrt();
        rx *= s;
        ry *= s;
    }

    let rx2 = rx * rx;
    let ry2 = ry * ry;
    let denom = rx2 * y1p * y1p + ry2 * x1p * x1p;
    let numer = (rx2 * ry2 - rx2 * y1p * y1p - ry2 * x1p * x1p).max(0.0);
    let sign = if large_arc == sweep { -1.0 } else { 1.0 };
    let coef = sign * (numer / denom).sqrt();
    let cxp = coef * (rx * y1p / ry);
    let cyp = coef * (-ry * x1p / rx);

    let cx = cos_phi * cxp - sin_phi * cyp + (from[0] + to[0]) / 2.0;
    let cy = sin_phi * cxp + cos_phi * cyp + (from[1] + to[1]) / 2.0;

    let angle = |u: Point2, v: Point2| (u[0] * v[1] - u[1] * v[0]).atan2(u[0] * v[0] + u[1] * v[1]);
    let u = [(x1p - cxp) / rx, (y1p - cyp) / ry];
    let v = [(-x1p - cxp) / rx, (-y1p - cyp) / ry];
    let mut theta = angle([1.0, 0.0], u);
    let mut delta = angle(u, v);
    if !sweep && delta > 0.0 {
        delta -= std::f64::consts::TAU;
    } else if sweep && delta < 0.0 {
        delta += std::f64::consts::TAU;
    }

    let count = ((delta.abs() / std::f64::consts::FRAC_PI_2).ceil() as usize).max(1);
    let step = delta / count as f64;
    let k = 4.0 / 3.0 * (step / 4.0).tan();
    let on_ellipse = |ux: f64, uy: f64| -> Point2 {
        [
            cx + cos_phi * rx * ux - sin_phi * ry * uy,
            cy + sin_phi * rx * ux + cos_phi * ry * uy,
        ]
    };

    let mut cubics = Vec::with_capacity(count);
    for i in 0..count {
        let t1 = theta + step;
        let (s0, c0) = theta.sin_cos();
        let (s1, c1) = t1.sin_cos();
        let cp1 = on_ellipse(c0 - k * s0, s0 + k * c0);
        let cp2 = on_ellipse(c1 + k * s1, s1 - k * c1);
        // Land exactly on the requested endpoint.
        let end = if i + 1 == count { to } else { on_ellipse(c1, s1) };
        cubics.push((cp1, cp2, end));
        theta = t1;
    }
    cubics
}
