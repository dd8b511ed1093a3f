//! The command loop: parses one command per line and dispatches it
//! against the session state (the loaded graph and its weights). Every
//! error is reported on stderr and leaves the session usable.
use anyhow::{bail, Context, Result};
use dnnfrs::graph::{parse_nnf, parse_weights, Graph, LinearObjective};
use dnnfrs::literal::Literal;
use dnnfrs::model::{Binding, CompactModel, Model};
use num_rational::BigRational;
use num_traits::{One, ToPrimitive};
use std::fs::File;
use std::io::{BufRead, BufReader, Write};

pub const HELP: &str = "Commands:
  cond [partial model] - conditions the graph according to partial model
  h                    - displays current help
  help                 - displays current help
  load filename        - loads a graph from file
  mc [partial model]   - count models
  min filename         - minimize objective function in file under the graph
  mintr filename       - keep models that minimize objective function in file only
  model [partial model]- display a valid model, if any
  nodes                - display number of nodes
  p                    - prints graph on standard output in d-DNNF format
  q                    - quits program
  store filename       - saves graph in d-DNNF format in filename
  vars                 - display number of vars
  w filename           - loads weights from file";

/// Run the command loop until `q` or end of input. `interactive`
/// controls whether a prompt is printed before each command.
pub fn run(input: &mut dyn BufRead, out: &mut dyn Write, interactive: bool) -> Result<()> {
    let mut session = Session::default();
    loop {
        if interactive {
            write!(out, "> ")?;
            out.flush()?;
        }
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(());
        }
        let fields: Vec<_> = line.split_whitespace().collect();
        match fields.first() {
            None => continue,
            Some(&"q") => return Ok(()),
            Some(_) => {
                if let Err(err) = session.dispatch(&fields, out) {
                    eprintln!("ERROR: {err:#}");
                }
            }
        }
    }
}

#[derive(Default)]
struct Session {
    graph: Option<Graph>,
}

impl Session {
    fn dispatch(&mut self, fields: &[&str], out: &mut dyn Write) -> Result<()> {
        match fields[0] {
            "load" => self.load(fields),
            "w" => self.load_weights(fields),
            "mc" => {
                let count = {
                    let graph = self.graph()?;
                    graph.model_count(&read_partial_model(graph.nb_vars(), fields)?)
                };
                writeln!(out, "{}", format_count(&count))?;
                Ok(())
            }
            "model" => {
                let model = {
                    let graph = self.graph()?;
                    graph.valid_model(&read_partial_model(graph.nb_vars(), fields)?)
                };
                match model {
                    Some(model) => writeln!(out, "{}", CompactModel::from(&model))?,
                    None => writeln!(out, "UNSAT")?,
                }
                Ok(())
            }
            "cond" => {
                let graph = self.graph_mut()?;
                let partial_model = read_partial_model(graph.nb_vars(), fields)?;
                graph.condition_to(&partial_model);
                Ok(())
            }
            "nodes" => {
                let nodes = self.graph()?.nb_nodes();
                writeln!(out, "{nodes}")?;
                Ok(())
            }
            "vars" => {
                let vars = self.graph()?.nb_vars();
                writeln!(out, "{vars}")?;
                Ok(())
            }
            "p" => self.graph()?.write_nnf(out),
            "store" => self.store(fields),
            "min" => self.minimize(fields, out),
            "mintr" => self.minimize_and_trim(fields, out),
            "h" | "help" => {
                writeln!(out, "{HELP}")?;
                Ok(())
            }
            other => bail!("invalid command {other:?}"),
        }
    }

    fn graph(&self) -> Result<&Graph> {
        self.graph.as_ref().context("load a graph first")
    }

    fn graph_mut(&mut self) -> Result<&mut Graph> {
        self.graph.as_mut().context("load a graph first")
    }

    fn load(&mut self, fields: &[&str]) -> Result<()> {
        let [_, path] = fields else {
            bail!("invalid call: load filename");
        };
        let file = File::open(path).with_context(|| format!("could not open {path:?}"))?;
        self.graph = Some(parse_nnf(&mut BufReader::new(file))?);
        Ok(())
    }

    fn load_weights(&mut self, fields: &[&str]) -> Result<()> {
        let [_, path] = fields else {
            bail!("invalid call: w filename");
        };
        let nb_vars = self.graph()?.nb_vars();
        let file = File::open(path).with_context(|| format!("could not open {path:?}"))?;
        let weights = parse_weights(&mut BufReader::new(file), nb_vars)?;
        self.graph_mut()?.set_weights(weights);
        Ok(())
    }

    fn store(&self, fields: &[&str]) -> Result<()> {
        let [_, path] = fields else {
            bail!("invalid call: store filename");
        };
        let graph = self.graph()?;
        let mut file = File::create(path).with_context(|| format!("could not open {path:?}"))?;
        graph.write_nnf(&mut file)
    }

    fn objective(&self, fields: &[&str]) -> Result<LinearObjective> {
        let [_, path] = fields else {
            bail!("invalid call: expected an objective filename");
        };
        let nb_vars = self.graph()?.nb_vars();
        let file = File::open(path).with_context(|| format!("could not open {path:?}"))?;
        LinearObjective::from_reader(nb_vars, &mut BufReader::new(file))
    }

    fn minimize(&self, fields: &[&str], out: &mut dyn Write) -> Result<()> {
        let objective = self.objective(fields)?;
        match objective.optimize_under_constraint(self.graph()?) {
            Some((value, model)) => {
                writeln!(out, "o {value}")?;
                writeln!(out, "{}", CompactModel::from(&model))?;
            }
            None => writeln!(out, "UNSAT")?,
        }
        Ok(())
    }

    fn minimize_and_trim(&mut self, fields: &[&str], out: &mut dyn Write) -> Result<()> {
        let objective = self.objective(fields)?;
        let outcome = objective.optimize_under_constraint(self.graph()?);
        match outcome {
            Some((value, _)) => {
                writeln!(out, "o {value}")?;
                writeln!(out, "c conditioning phase begins")?;
                let trimmed = objective.keep_bounded_weight_models(self.graph()?, value);
                self.graph = Some(trimmed);
            }
            None => writeln!(out, "UNSAT")?,
        }
        Ok(())
    }
}

/// Read a partial model from command fields: a list of nonzero literals,
/// optionally terminated by `0`. The first field (the command name) is
/// skipped.
fn read_partial_model(nb_vars: u32, fields: &[&str]) -> Result<Model> {
    let mut partial_model = Model::new(nb_vars);
    for field in &fields[1..] {
        let lit: i32 = field
            .parse()
            .with_context(|| format!("invalid argument {field:?}"))?;
        if lit == 0 {
            break;
        }
        if lit.unsigned_abs() > nb_vars {
            bail!("invalid literal {lit}: the graph has {nb_vars} variables");
        }
        let lit = Literal::from_dimacs(lit);
        partial_model.set_binding_for(lit.variable(), Binding::from(lit.polarity()));
    }
    Ok(partial_model)
}

/// Integral counts print as integers, the rest as an approximation
/// rather than an exact fraction.
fn format_count(count: &BigRational) -> String {
    if count.denom().is_one() {
        return count.to_string();
    }
    match count.to_f64() {
        Some(approx) => format!("{approx:e}"),
        None => count.to_string(),
    }
}
