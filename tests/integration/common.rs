//! Deterministic evaluator and line source shared by the integration tests.
//!
//! The evaluator understands a tiny slice of PHP: integer and string
//! literals, `$a + $b`, `new Class()`, `echo`, `return`, `throw`,
//! `function name() {}`, `if (true) { ... }` and `exit()`.

use std::collections::{BTreeMap, VecDeque};

use scriptify::terminal::{
    Bindings, EvalError, Evaluation, Evaluator, Input, LineSource, SymbolTable, TerminalResult,
    Value, ValueKind,
};

#[derive(Debug, Default)]
pub struct ScriptedEvaluator {
    /// Qualified class name to public members
    pub classes: BTreeMap<String, Vec<String>>,
    pub functions: Vec<String>,
    /// Every unit received, in order
    pub calls: Vec<String>,
    /// Bindings received with each unit
    pub inputs: Vec<Bindings>,
}

impl ScriptedEvaluator {
    pub fn new() -> Self {
        let mut evaluator = Self::default();
        evaluator.functions = vec!["strlen".to_string(), "str_replace".to_string()];
        evaluator.classes.insert(
            r"Acme\Widget".to_string(),
            vec!["getName".into(), "getSize".into(), "__construct".into(), "name".into()],
        );
        evaluator
            .classes
            .insert("ArrayObject".to_string(), vec!["count".into(), "offsetGet".into()]);
        evaluator
    }

    fn run(
        &mut self,
        code: &str,
        vars: &mut Bindings,
        output: &mut String,
    ) -> Result<Option<Value>, EvalError> {
        if let Some(body) = code
            .strip_prefix("if (true) {")
            .and_then(|rest| rest.strip_suffix('}'))
        {
            return self.run(body, vars, output);
        }

        let mut result = None;
        for statement in code.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            if let Some(expr) = statement.strip_prefix("return ") {
                let expr = expr.trim().trim_start_matches('(').trim_end_matches(')');
                result = Some(self.value_of(expr, vars)?);
            } else if let Some(expr) = statement.strip_prefix("echo ") {
                let value = self.value_of(expr, vars)?;
                match value.kind {
                    ValueKind::String => output.push_str(value.repr.trim_matches('\'')),
                    _ => output.push_str(&value.repr),
                }
            } else if let Some(message) = statement.strip_prefix("throw ") {
                return Err(EvalError::Runtime {
                    kind: "Exception".to_string(),
                    message: message.trim().to_string(),
                    file: Some("eval()'d code".to_string()),
                    line: Some(1),
                });
            } else if let Some(rest) = statement.strip_prefix("function ") {
                let name = rest.split('(').next().unwrap_or_default().trim();
                self.functions.push(name.to_string());
            } else if statement == "exit()" {
                return Err(EvalError::Disconnected {
                    output: output.clone(),
                });
            } else if let Some((target, expr)) = statement.split_once('=') {
                let name = target
                    .trim()
                    .strip_prefix('$')
                    .ok_or_else(|| parse_error(statement))?;
                let value = self.value_of(expr.trim(), vars)?;
                vars.insert(name.to_string(), value);
            } else {
                return Err(parse_error(statement));
            }
        }
        Ok(result)
    }

    fn value_of(
        &self,
        expr: &str,
        vars: &Bindings,
    ) -> Result<Value, EvalError> {
        let expr = expr.trim();
        if let Some((lhs, rhs)) = expr.split_once('+') {
            let sum = self.int_of(lhs, vars)? + self.int_of(rhs, vars)?;
            return Ok(Value::int(sum));
        }
        if let Some(class) = expr.strip_prefix("new ") {
            let class = class.trim_end_matches("()").trim();
            return match self.classes.get(class) {
                Some(members) => Ok(Value::object(class, members.iter().cloned())),
                None => Err(EvalError::Runtime {
                    kind: "Error".to_string(),
                    message: format!("Class \"{}\" not found", class),
                    file: Some("eval()'d code".to_string()),
                    line: Some(1),
                }),
            };
        }
        if let Some(name) = expr.strip_prefix('$') {
            return vars.get(name).cloned().ok_or_else(|| EvalError::Runtime {
                kind: "Warning".to_string(),
                message: format!("Undefined variable ${}", name),
                file: None,
                line: None,
            });
        }
        if expr.len() >= 2 && expr.starts_with('\'') && expr.ends_with('\'') {
            return Ok(Value::string(&expr[1..expr.len() - 1]));
        }
        expr.parse::<i64>()
            .map(Value::int)
            .map_err(|_| parse_error(expr))
    }

    fn int_of(
        &self,
        expr: &str,
        vars: &Bindings,
    ) -> Result<i64, EvalError> {
        let value = self.value_of(expr, vars)?;
        value.repr.parse().map_err(|_| EvalError::Runtime {
            kind: "TypeError".to_string(),
            message: format!("Unsupported operand {}", value.repr),
            file: None,
            line: None,
        })
    }
}

fn parse_error(near: &str) -> EvalError {
    EvalError::Parse {
        message: format!("syntax error, unexpected '{}'", near),
        line: Some(1),
    }
}

impl Evaluator for ScriptedEvaluator {
    fn evaluate(
        &mut self,
        code: &str,
        bindings: &Bindings,
    ) -> Result<Evaluation, EvalError> {
        self.calls.push(code.to_string());
        self.inputs.push(bindings.clone());

        let mut vars = bindings.clone();
        let mut output = String::new();
        let result = self.run(code, &mut vars, &mut output)?;
        // housekeeping names leak from the host scope
        vars.insert("this".to_string(), Value::object("Closure", ["bindTo"]));
        vars.insert("code".to_string(), Value::string(code));
        Ok(Evaluation {
            result,
            bindings: vars,
            output,
        })
    }

    fn symbols(&mut self) -> Result<SymbolTable, EvalError> {
        Ok(SymbolTable {
            functions: self.functions.clone(),
            classes: self.classes.keys().cloned().collect(),
        })
    }
}

/// Line source replaying a fixed list of inputs, then end of input
#[derive(Debug, Default)]
pub struct ScriptedLines {
    inputs: VecDeque<Input>,
    history: Vec<String>,
    pub prompts: Vec<String>,
}

impl ScriptedLines {
    pub fn new(inputs: Vec<Input>) -> Self {
        Self {
            inputs: inputs.into(),
            ..Default::default()
        }
    }

    pub fn lines(lines: &[&str]) -> Self {
        Self::new(lines.iter().map(|l| Input::Line(l.to_string())).collect())
    }
}

impl LineSource for ScriptedLines {
    fn read(
        &mut self,
        prompt: &str,
    ) -> TerminalResult<Input> {
        self.prompts.push(prompt.to_string());
        Ok(self.inputs.pop_front().unwrap_or(Input::Eof))
    }

    fn add_history(
        &mut self,
        line: &str,
    ) {
        self.history.push(line.to_string());
    }

    fn history(&self) -> Vec<String> {
        self.history.clone()
    }
}
