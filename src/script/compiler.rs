use crate::animation::ease::Ease;
use crate::foundation::core::{Point, TransportOp};
use crate::foundation::error::{LiveMixError, LiveMixResult};
use crate::graph::pipeline::PipelineSpec;
use crate::script::lexer::{Line, lex};
use crate::script::program::{
    Action, ActionGroup, BindingDef, BindingSource, GroupMode, MoveSpec, PortRef, Program,
    Statement, TemplateDef, Trigger, TriggerBinding,
};
use crate::script::value::PropType;

/// Keywords that may only appear at the top level of a script.
const TOP_LEVEL: &[&str] = &["raw", "war", "new", "plug", "unplug", "on", "wrap", "parw"];

/// Compile script text into a [`Program`].
///
/// Compilation is purely syntactic: references between statements are checked later by
/// [`crate::script::validate::validate`], once the template set is known.
#[tracing::instrument(skip(src), fields(bytes = src.len()))]
pub fn compile(src: &str) -> LiveMixResult<Program> {
    let mut c = Compiler {
        lines: lex(src).into_iter(),
        program: Program::default(),
    };
    c.run()?;
    tracing::debug!(
        templates = c.program.templates.len(),
        statements = c.program.statements.len(),
        triggers = c.program.triggers.len(),
        "script compiled"
    );
    Ok(c.program)
}

struct Compiler<'a> {
    lines: std::vec::IntoIter<Line<'a>>,
    program: Program,
}

impl Compiler<'_> {
    fn run(&mut self) -> LiveMixResult<()> {
        while let Some(line) = self.lines.next() {
            match line.keyword() {
                "raw" => self.template(&line)?,
                "new" => self.new_instance(&line)?,
                "plug" => self.plug(&line)?,
                "unplug" => self.unplug(&line)?,
                "on" => self.binding(&line)?,
                "war" => {
                    return Err(LiveMixError::unbalanced(
                        line.number,
                        "'war' without an open 'raw' block",
                    ));
                }
                "parw" => {
                    return Err(LiveMixError::unbalanced(
                        line.number,
                        "'parw' without an open 'wrap' block",
                    ));
                }
                kw @ ("act" | "terminate" | "wrap") => {
                    return Err(LiveMixError::syntax(
                        line.number,
                        format!("'{kw}' must follow an 'on' trigger"),
                    ));
                }
                other => {
                    return Err(LiveMixError::syntax(
                        line.number,
                        format!("unknown keyword '{other}'"),
                    ));
                }
            }
        }
        Ok(())
    }

    fn template(&mut self, line: &Line<'_>) -> LiveMixResult<()> {
        let args = line.args();
        if args.len() < 3 {
            return Err(LiveMixError::syntax(
                line.number,
                "'raw' expects <name> <param-count> <pipeline...>",
            ));
        }
        let name = args[0];
        let param_count = count(line.number, "parameter count", args[1])?;
        if self.program.templates.iter().any(|t| t.name == name) {
            return Err(LiveMixError::syntax(
                line.number,
                format!("template '{name}' is defined twice"),
            ));
        }
        let pipeline = PipelineSpec::parse(&args[2..].join(" ")).map_err(|msg| {
            LiveMixError::syntax(line.number, format!("pipeline of '{name}': {msg}"))
        })?;

        let mut bindings = Vec::new();
        loop {
            let Some(inner) = self.lines.next() else {
                return Err(LiveMixError::unbalanced(
                    line.number,
                    format!("'raw {name}' is never closed by 'war'"),
                ));
            };
            match inner.keyword() {
                "war" => {
                    expect_args(&inner, 0)?;
                    break;
                }
                // `raw <property> <type> <value>` binds an instance attribute.
                "raw" if inner.tokens.len() == 4 => {
                    bindings.push(binding_line(&inner, param_count)?);
                }
                kw if TOP_LEVEL.contains(&kw) => {
                    return Err(LiveMixError::unbalanced(
                        inner.number,
                        format!("'{kw}' inside 'raw {name}', missing 'war'"),
                    ));
                }
                _ => bindings.push(binding_line(&inner, param_count)?),
            }
        }

        self.program.templates.push(TemplateDef {
            name: name.to_owned(),
            param_count,
            pipeline,
            bindings,
            line: line.number,
        });
        Ok(())
    }

    fn new_instance(&mut self, line: &Line<'_>) -> LiveMixResult<()> {
        let args = line.args();
        if args.len() < 2 {
            return Err(LiveMixError::syntax(
                line.number,
                "'new' expects <template> <instance> <args...>",
            ));
        }
        self.program.statements.push(Statement::New {
            template: args[0].to_owned(),
            instance: args[1].to_owned(),
            args: args[2..].iter().map(|s| (*s).to_owned()).collect(),
            line: line.number,
        });
        Ok(())
    }

    fn plug(&mut self, line: &Line<'_>) -> LiveMixResult<()> {
        expect_args(line, 4)?;
        let a = line.args();
        self.program.statements.push(Statement::Plug {
            src: PortRef::new(a[1], a[0]),
            dst: PortRef::new(a[3], a[2]),
            line: line.number,
        });
        Ok(())
    }

    fn unplug(&mut self, line: &Line<'_>) -> LiveMixResult<()> {
        expect_args(line, 2)?;
        let a = line.args();
        self.program.statements.push(Statement::Unplug {
            dst: PortRef::new(a[1], a[0]),
            line: line.number,
        });
        Ok(())
    }

    fn binding(&mut self, line: &Line<'_>) -> LiveMixResult<()> {
        let args = line.args();
        let (trigger, rest) = match args.first().copied() {
            Some("pre") => (Trigger::Pre, &args[1..]),
            Some("progress") => {
                if args.len() < 3 {
                    return Err(LiveMixError::syntax(
                        line.number,
                        "'on progress' expects <clock> <threshold>",
                    ));
                }
                let threshold = progress(line.number, "threshold", args[2])?;
                let trigger = Trigger::Progress {
                    clock: args[1].to_owned(),
                    threshold,
                };
                (trigger, &args[3..])
            }
            Some("callback") => {
                if args.len() < 3 {
                    return Err(LiveMixError::syntax(
                        line.number,
                        "'on callback' expects <instance> <event>",
                    ));
                }
                let trigger = Trigger::Callback {
                    instance: args[1].to_owned(),
                    event: args[2].to_owned(),
                };
                (trigger, &args[3..])
            }
            Some(other) => {
                return Err(LiveMixError::syntax(
                    line.number,
                    format!("unknown trigger '{other}'"),
                ));
            }
            None => {
                return Err(LiveMixError::syntax(line.number, "'on' expects a trigger"));
            }
        };

        let group = match rest {
            ["act", ..] => ActionGroup {
                mode: GroupMode::Sequential,
                actions: vec![action(line.number, rest)?],
            },
            ["terminate"] => ActionGroup {
                mode: GroupMode::Sequential,
                actions: vec![Action::Terminate],
            },
            ["wrap"] => self.wrap_block(line.number)?,
            _ => {
                return Err(LiveMixError::syntax(
                    line.number,
                    "expected 'act', 'terminate' or 'wrap' after the trigger",
                ));
            }
        };

        let order = self.program.triggers.len();
        self.program.triggers.push(TriggerBinding {
            trigger,
            group,
            order,
            line: line.number,
        });
        Ok(())
    }

    fn wrap_block(&mut self, open_line: usize) -> LiveMixResult<ActionGroup> {
        let mut actions = Vec::new();
        loop {
            let Some(inner) = self.lines.next() else {
                return Err(LiveMixError::unbalanced(
                    open_line,
                    "'wrap' is never closed by 'parw'",
                ));
            };
            match inner.tokens.as_slice() {
                ["parw"] => break,
                ["act", ..] => actions.push(action(inner.number, &inner.tokens)?),
                ["terminate"] => actions.push(Action::Terminate),
                [kw, ..] if TOP_LEVEL.contains(kw) => {
                    return Err(LiveMixError::unbalanced(
                        inner.number,
                        format!("'{kw}' inside 'wrap', missing 'parw'"),
                    ));
                }
                _ => {
                    return Err(LiveMixError::syntax(
                        inner.number,
                        "expected 'act', 'terminate' or 'parw' inside 'wrap'",
                    ));
                }
            }
        }
        Ok(ActionGroup {
            mode: GroupMode::Parallel,
            actions,
        })
    }
}

fn binding_line(line: &Line<'_>, param_count: usize) -> LiveMixResult<BindingDef> {
    let [element, property, ty, value] = line.tokens.as_slice() else {
        return Err(LiveMixError::syntax(
            line.number,
            "binding lines take <element> <property> <type> <value>",
        ));
    };
    let ty = prop_type(line.number, ty)?;

    let source = match value.strip_prefix('$') {
        Some(reference) => {
            let (index, default) = match reference.split_once('=') {
                Some((i, d)) => (i, Some(d)),
                None => (reference, None),
            };
            let index = count(line.number, "parameter reference", index)?;
            if index == 0 || index > param_count {
                return Err(LiveMixError::syntax(
                    line.number,
                    format!("'{value}' is outside the declared {param_count} parameter(s)"),
                ));
            }
            if let Some(d) = default {
                ty.coerce(d)
                    .map_err(|e| LiveMixError::syntax(line.number, e.to_string()))?;
            }
            BindingSource::Arg {
                index,
                default: default.map(str::to_owned),
            }
        }
        None => {
            ty.coerce(value)
                .map_err(|e| LiveMixError::syntax(line.number, e.to_string()))?;
            BindingSource::Literal((*value).to_owned())
        }
    };

    Ok(BindingDef {
        element: (*element).to_owned(),
        property: (*property).to_owned(),
        ty,
        source,
    })
}

/// Parse `act <instance> <verb> <args...>`.
fn action(line: usize, tokens: &[&str]) -> LiveMixResult<Action> {
    let [_, target, verb, a @ ..] = tokens else {
        return Err(LiveMixError::syntax(
            line,
            "'act' expects <instance> <verb> <args...>",
        ));
    };
    let target = (*target).to_owned();

    match *verb {
        "play" => {
            let [op] = a else {
                return Err(LiveMixError::syntax(line, "'play' expects one of start|pause|stop"));
            };
            let op = TransportOp::parse_play(op).ok_or_else(|| {
                LiveMixError::syntax(line, format!("unknown play operation '{op}'"))
            })?;
            Ok(Action::Transport { target, op })
        }
        "seek" => {
            let [from, to] = a else {
                return Err(LiveMixError::syntax(line, "'seek' expects <from> <to>"));
            };
            let op = TransportOp::Seek {
                from: number(line, "seek position", from)?,
                to: number(line, "seek position", to)?,
            };
            Ok(Action::Transport { target, op })
        }
        "prop" => {
            let [element, name, ty, value @ ..] = a else {
                return Err(LiveMixError::syntax(
                    line,
                    "'prop' expects <element> <name> <type> <value>",
                ));
            };
            if value.is_empty() {
                return Err(LiveMixError::syntax(line, "'prop' is missing its value"));
            }
            let ty = prop_type(line, ty)?;
            let text = value.join(" ");
            // Enum tokens resolve now; numeric coercion waits for dispatch.
            if matches!(ty, PropType::Enum(_)) {
                ty.coerce(&text)
                    .map_err(|e| LiveMixError::syntax(line, e.to_string()))?;
            }
            Ok(Action::SetProperty {
                target,
                element: (*element).to_owned(),
                name: (*name).to_owned(),
                ty,
                text,
            })
        }
        "window" => match a {
            ["show"] => Ok(Action::WindowShow { target }),
            ["move", clock, t0, x0, y0, t1, x1, y1, ex, ey] => {
                let t0 = progress(line, "start time", t0)?;
                let t1 = progress(line, "end time", t1)?;
                if t1 < t0 {
                    return Err(LiveMixError::syntax(
                        line,
                        format!("window move ends ({t1}) before it starts ({t0})"),
                    ));
                }
                let spec = MoveSpec {
                    clock: (*clock).to_owned(),
                    t0,
                    from: Point::new(number(line, "x", x0)?, number(line, "y", y0)?),
                    t1,
                    to: Point::new(number(line, "x", x1)?, number(line, "y", y1)?),
                    ease_x: ease(line, ex)?,
                    ease_y: ease(line, ey)?,
                };
                Ok(Action::WindowMove { target, spec })
            }
            ["move", ..] => Err(LiveMixError::syntax(
                line,
                "'window move' expects <clock> <t0> <x0> <y0> <t1> <x1> <y1> <ease-x> <ease-y>",
            )),
            _ => Err(LiveMixError::syntax(line, "'window' expects 'show' or 'move'")),
        },
        other => Err(LiveMixError::syntax(line, format!("unknown verb '{other}'"))),
    }
}

fn expect_args(line: &Line<'_>, n: usize) -> LiveMixResult<()> {
    let got = line.args().len();
    if got != n {
        return Err(LiveMixError::syntax(
            line.number,
            format!("'{}' takes {n} argument(s), got {got}", line.keyword()),
        ));
    }
    Ok(())
}

fn number(line: usize, what: &str, token: &str) -> LiveMixResult<f64> {
    token
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| LiveMixError::syntax(line, format!("malformed {what} '{token}'")))
}

/// A point on a clock's normalized progress scale.
fn progress(line: usize, what: &str, token: &str) -> LiveMixResult<f64> {
    let value = number(line, what, token)?;
    if !(0.0..=1.0).contains(&value) {
        return Err(LiveMixError::syntax(
            line,
            format!("{what} '{token}' is outside the progress range 0..=1"),
        ));
    }
    Ok(value)
}

fn count(line: usize, what: &str, token: &str) -> LiveMixResult<usize> {
    token
        .parse::<usize>()
        .map_err(|_| LiveMixError::syntax(line, format!("malformed {what} '{token}'")))
}

fn prop_type(line: usize, tag: &str) -> LiveMixResult<PropType> {
    PropType::parse(tag)
        .ok_or_else(|| LiveMixError::syntax(line, format!("unknown property type '{tag}'")))
}

fn ease(line: usize, token: &str) -> LiveMixResult<Ease> {
    Ease::from_token(token)
        .ok_or_else(|| LiveMixError::syntax(line, format!("unknown easing '{token}'")))
}

#[cfg(test)]
#[path = "../../tests/unit/script/compiler.rs"]
mod tests;
