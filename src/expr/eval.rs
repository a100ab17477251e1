use super::{BinaryOp, Expr, ExprError, Function};

/// Values visible to an expression while it is evaluated for one row.
pub trait Bindings {
    fn lookup(&self, name: &str) -> Option<f64>;
}

impl<S: AsRef<str>> Bindings for [(S, f64)] {
    fn lookup(&self, name: &str) -> Option<f64> {
        self.iter().find(|(n, _)| n.as_ref() == name).map(|(_, v)| *v)
    }
}

impl<S: AsRef<str>> Bindings for Vec<(S, f64)> {
    fn lookup(&self, name: &str) -> Option<f64> {
        self.as_slice().lookup(name)
    }
}

/// Evaluate a tree. Every intermediate result must stay finite.
pub fn evaluate<B: Bindings + ?Sized>(expr: &Expr, env: &B) -> Result<f64, ExprError> {
    match expr {
        Expr::Literal(v) => finite(*v),
        Expr::Column(name) => env
            .lookup(name)
            .ok_or_else(|| ExprError::UnboundColumn(name.clone()))
            .and_then(finite),
        Expr::Constant(c) => Ok(c.value()),
        Expr::Negate(inner) => Ok(-evaluate(inner.as_ref(), env)?),
        Expr::Binary { op, left, right } => {
            let l = evaluate(left.as_ref(), env)?;
            let r = evaluate(right.as_ref(), env)?;
            let value = match op {
                BinaryOp::Add => l + r,
                BinaryOp::Sub => l - r,
                BinaryOp::Mul => l * r,
                BinaryOp::Div => {
                    if r == 0.0 {
                        return Err(ExprError::DivisionByZero);
                    }
                    l / r
                }
            };
            finite(value)
        }
        Expr::Call { function, args } => {
            let values = args
                .iter()
                .map(|a| evaluate(a, env))
                .collect::<Result<Vec<f64>, _>>()?;
            finite(apply(*function, &values)?)
        }
    }
}

fn finite(value: f64) -> Result<f64, ExprError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ExprError::NonFinite)
    }
}

fn apply(function: Function, args: &[f64]) -> Result<f64, ExprError> {
    let arity_error = || ExprError::Arity {
        function,
        got: args.len(),
    };
    let single = || match args {
        [x] => Ok(*x),
        _ => Err(arity_error()),
    };

    match function {
        Function::Min => args.iter().copied().reduce(f64::min).ok_or_else(arity_error),
        Function::Max => args.iter().copied().reduce(f64::max).ok_or_else(arity_error),
        Function::Sum => Ok(args.iter().sum()),
        Function::Count => Ok(args.len() as f64),
        Function::Abs => Ok(single()?.abs()),
        Function::Ln | Function::Log10 => {
            let x = single()?;
            if x <= 0.0 {
                return Err(ExprError::Domain { function, value: x });
            }
            Ok(if function == Function::Ln { x.ln() } else { x.log10() })
        }
        Function::Sqrt => {
            let x = single()?;
            if x < 0.0 {
                return Err(ExprError::Domain { function, value: x });
            }
            Ok(x.sqrt())
        }
        Function::Exp => Ok(single()?.exp()),
        Function::Sin => Ok(single()?.sin()),
        Function::Cos => Ok(single()?.cos()),
        Function::Tan => Ok(single()?.tan()),
    }
}
