/*
 * Copyright (c) 2021, 2022 Frank Fischer <frank-fischer@shadow-soft.de>
 *
 * This program is free software: you can redistribute it and/or
 * modify it under the terms of the GNU General Public License as
 * published by the Free Software Foundation, either version 3 of the
 * License, or (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful, but
 * WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU
 * General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program.  If not, see  <http://www.gnu.org/licenses/>
 */

use rs_crossover::crossover::{network_crossover, CrossoverMethod, CrossoverSettings, NetworkProblem};
use rs_crossover::dimacs;
use rs_crossover::simplex::SimplexSolver;
use std::error::Error;
use std::io::Write;

use rustop::opts;
use time::OffsetDateTime;

fn main() -> Result<(), Box<dyn Error>> {
    let (args, _) = opts! {
        synopsis "Compute a basic solution from an interior point of a min-cost-flow problem.";
        param file:String, desc:"Instance file name (DIMACS min format)";
        param flows:String, desc:"Interior point file name (one flow value per arc)";
        opt tree:bool, desc:"Use the tree method instead of column generation";
        opt output:Option<String>, desc:"Write the basic flows to this file";
    }
    .parse_or_exit();

    let tstart = OffsetDateTime::now_utc();
    let instance = dimacs::read_from_file::<f64>(&args.file)?;
    let x = dimacs::read_flows_from_file::<f64>(&args.flows)?;
    let tend = OffsetDateTime::now_utc();

    println!("Instance            : {}", args.file);
    println!("Interior point      : {}", args.flows);
    println!("Read Time (seconds) : {}", (tend - tstart).as_seconds_f64());
    println!("Number of nodes     : {}", instance.nr_nodes());
    println!("Number of arcs      : {}", instance.nr_arcs());

    let method = if args.tree {
        CrossoverMethod::Tree
    } else {
        CrossoverMethod::ColumnGenerationFlow
    };

    let mut solver = SimplexSolver::new();
    solver.zero = 1e-9;
    let settings = CrossoverSettings::default();

    let out = network_crossover(&NetworkProblem::Flow(instance), &x, method, &mut solver, &settings)?;

    println!();
    println!("Method              : {:?}", method);
    println!("Objective           : {:.2}", out.objective);
    println!("Basic variables     : {}", out.basis.nr_basic());
    println!("Time (seconds)      : {:.2}", out.runtime.as_secs_f64());
    println!("Iterations (total)  : {}", out.iterations);

    if let Some(output) = args.output {
        println!();
        println!("Write flows to      : {}", output);

        let f = &mut std::fs::File::create(&output)?;
        writeln!(f, "c basic flows computed by a crossover")?;
        writeln!(f, "c instance : {}", args.file)?;
        writeln!(f, "c objective: {:.2}", out.objective)?;
        dimacs::write_flows(f, &out.x)?;
    }

    Ok(())
}
