use delivery_cost::pipeline::run;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    run::run()
}
