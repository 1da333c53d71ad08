use std::collections::HashMap;
use std::process;

use anyhow::{Result, anyhow, bail, ensure};
use galaxy_economy_core::{SimTime, Simulation};

use super::{
    PRICE_DECIMALS, credits_to_string, parse_credits, print_credits, print_help, print_overview,
    print_price_table, print_system_details, resolve_commodity, resolve_planet, resolve_system,
};

pub struct Context<'a> {
    sim: &'a mut Simulation,
}

impl<'a> Context<'a> {
    pub fn new(sim: &'a mut Simulation) -> Self {
        Self { sim }
    }

    pub fn sim(&self) -> &Simulation {
        &*self.sim
    }

    pub fn sim_mut(&mut self) -> &mut Simulation {
        &mut *self.sim
    }
}

pub struct Args<'a> {
    tokens: Vec<&'a str>,
    index: usize,
}

impl<'a> Args<'a> {
    pub fn new(tokens: Vec<&'a str>) -> Self {
        Self { tokens, index: 0 }
    }

    pub fn next(&mut self) -> Option<&'a str> {
        if self.index >= self.tokens.len() {
            return None;
        }
        let value = self.tokens[self.index];
        self.index += 1;
        Some(value)
    }

    pub fn next_required(&mut self, message: &str) -> Result<&'a str> {
        self.next().ok_or_else(|| anyhow!(message.to_owned()))
    }
}

pub trait Command {
    fn name() -> &'static str;
    fn execute(ctx: &mut Context<'_>, args: Args<'_>) -> Result<()>;
}

type CommandFn = for<'a> fn(&mut Context<'a>, Args<'a>) -> Result<()>;

pub struct CommandRegistry {
    handlers: HashMap<&'static str, CommandFn>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    pub fn register<C: Command>(&mut self) {
        let name = C::name();
        if self.handlers.insert(name, C::execute).is_some() {
            panic!("重複したコマンド登録です: {name}");
        }
    }

    pub fn dispatch<'a>(&self, command: &str, ctx: &mut Context<'a>, args: Args<'a>) -> Result<()> {
        if let Some(handler) = self.handlers.get(command) {
            handler(ctx, args)
        } else {
            bail!("未対応のコマンドです: {command}. help で一覧を確認してください。");
        }
    }

    pub fn execute_input<'a>(&self, ctx: &mut Context<'a>, input: &'a str) -> Result<()> {
        let mut parts = input.split_whitespace();
        let Some(head) = parts.next() else {
            return Err(anyhow!("コマンドが指定されていません。"));
        };
        let command_name = head.to_ascii_lowercase();
        let args = Args::new(parts.collect());
        self.dispatch(command_name.as_str(), ctx, args)
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        let mut registry = Self::new();
        registry.register::<HelpCommand>();
        registry.register::<HelpAliasCommand>();
        registry.register::<OverviewCommand>();
        registry.register::<OverviewAliasCommand>();
        registry.register::<SystemCommand>();
        registry.register::<PriceCommand>();
        registry.register::<PricesCommand>();
        registry.register::<SolverCommand>();
        registry.register::<TickCommand>();
        registry.register::<LinkCommand>();
        registry.register::<UnlinkCommand>();
        registry.register::<RefreshCommand>();
        registry.register::<CreditsCommand>();
        registry.register::<QuitCommand>();
        registry.register::<ExitCommand>();
        registry
    }
}

pub struct HelpCommand;

impl Command for HelpCommand {
    fn name() -> &'static str {
        "help"
    }

    fn execute(_ctx: &mut Context<'_>, _args: Args<'_>) -> Result<()> {
        print_help();
        Ok(())
    }
}

pub struct HelpAliasCommand;

impl Command for HelpAliasCommand {
    fn name() -> &'static str {
        "?"
    }

    fn execute(ctx: &mut Context<'_>, args: Args<'_>) -> Result<()> {
        HelpCommand::execute(ctx, args)
    }
}

pub struct OverviewCommand;

impl Command for OverviewCommand {
    fn name() -> &'static str {
        "overview"
    }

    fn execute(ctx: &mut Context<'_>, _args: Args<'_>) -> Result<()> {
        print_overview(ctx.sim());
        Ok(())
    }
}

pub struct OverviewAliasCommand;

impl Command for OverviewAliasCommand {
    fn name() -> &'static str {
        "ov"
    }

    fn execute(ctx: &mut Context<'_>, args: Args<'_>) -> Result<()> {
        OverviewCommand::execute(ctx, args)
    }
}

pub struct SystemCommand;

impl Command for SystemCommand {
    fn name() -> &'static str {
        "system"
    }

    fn execute(ctx: &mut Context<'_>, mut args: Args<'_>) -> Result<()> {
        let token = args.next_required("星系を指定してください。")?;
        let id = resolve_system(ctx.sim(), token)?;
        print_system_details(ctx.sim(), id)
    }
}

pub struct PriceCommand;

impl Command for PriceCommand {
    fn name() -> &'static str {
        "price"
    }

    fn execute(ctx: &mut Context<'_>, mut args: Args<'_>) -> Result<()> {
        let commodity_token = args.next_required("商品を指定してください。")?;
        let system_token = args.next_required("星系を指定してください。")?;
        let planet_token = args.next_required("惑星を指定してください。")?;
        let sim = ctx.sim();
        let commodity = resolve_commodity(sim, commodity_token)?;
        let id = resolve_system(sim, system_token)?;
        let system = sim
            .galaxy()
            .system(id)
            .ok_or_else(|| anyhow!("星系が存在しません: {}", id))?;
        let planet = resolve_planet(system, planet_token)?;
        let price = sim.price(&commodity, id, &planet);
        println!(
            "{} @ {} ({}): {} クレジット [{}]",
            commodity,
            planet,
            system.name,
            credits_to_string(price, -1),
            sim.now()
        );
        Ok(())
    }
}

pub struct PricesCommand;

impl Command for PricesCommand {
    fn name() -> &'static str {
        "prices"
    }

    fn execute(ctx: &mut Context<'_>, mut args: Args<'_>) -> Result<()> {
        let system_token = args.next_required("星系を指定してください。")?;
        let sim = ctx.sim();
        let id = resolve_system(sim, system_token)?;
        let system = sim
            .galaxy()
            .system(id)
            .ok_or_else(|| anyhow!("星系が存在しません: {}", id))?;
        let planet = args
            .next()
            .map(|token| resolve_planet(system, token))
            .transpose()?;
        print_price_table(sim, system, planet.as_deref());
        Ok(())
    }
}

pub struct SolverCommand;

impl Command for SolverCommand {
    fn name() -> &'static str {
        "solver"
    }

    fn execute(ctx: &mut Context<'_>, mut args: Args<'_>) -> Result<()> {
        let sim = ctx.sim();
        let economy = sim.economy();
        let filter = args
            .next()
            .map(|token| resolve_commodity(sim, token))
            .transpose()?;
        ensure!(
            economy.is_initialised(),
            "価格ネットワークが初期化されていません。"
        );
        if let Some(network) = economy.solver().network() {
            println!(
                "ネットワーク: {} 星系 / 非零要素 {} / 再構築 {} 回{}",
                network.dimension(),
                network.matrix().nnz(),
                economy.solver().rebuild_count(),
                if economy.is_dirty() { " (再構築待ち)" } else { "" }
            );
        }
        for &id in economy.catalog().priced() {
            let Some(commodity) = economy.catalog().commodity(id) else {
                continue;
            };
            if filter.as_ref().is_some_and(|name| *name != commodity.name) {
                continue;
            }
            println!("-- {} --", commodity.name);
            for system in sim.galaxy().systems() {
                let value = economy
                    .multiplier(id, system.id)
                    .map(|m| format!("{m:.4}"))
                    .unwrap_or_else(|| "-".to_string());
                println!("  {:<16} {}", system.name, value);
            }
        }
        Ok(())
    }
}

pub struct TickCommand;

impl Command for TickCommand {
    fn name() -> &'static str {
        "tick"
    }

    fn execute(ctx: &mut Context<'_>, mut args: Args<'_>) -> Result<()> {
        let token = args.next_required("進める STP を指定してください。")?;
        let periods: f64 = token
            .parse()
            .map_err(|_| anyhow!("STP は数値で指定してください。"))?;
        ensure!(
            periods.is_finite() && periods >= 0.0,
            "STP は 0 以上で指定してください。"
        );
        let dt = SimTime::from_stp(periods).ntime();
        let report = ctx.sim_mut().advance(dt)?;
        println!(
            "{:.2} STP 進めました。現在 {} (解 {} / 失敗 {})",
            periods,
            ctx.sim().now(),
            report.solved,
            report.failed
        );
        Ok(())
    }
}

pub struct LinkCommand;

impl Command for LinkCommand {
    fn name() -> &'static str {
        "link"
    }

    fn execute(ctx: &mut Context<'_>, mut args: Args<'_>) -> Result<()> {
        let first = args.next_required("接続元の星系を指定してください。")?;
        let second = args.next_required("接続先の星系を指定してください。")?;
        let a = resolve_system(ctx.sim(), first)?;
        let b = resolve_system(ctx.sim(), second)?;
        ctx.sim_mut().link(a, b)?;
        println!("航路を追加しました。次の tick で価格ネットワークを再構築します。");
        Ok(())
    }
}

pub struct UnlinkCommand;

impl Command for UnlinkCommand {
    fn name() -> &'static str {
        "unlink"
    }

    fn execute(ctx: &mut Context<'_>, mut args: Args<'_>) -> Result<()> {
        let first = args.next_required("星系を指定してください。")?;
        let second = args.next_required("星系を指定してください。")?;
        let a = resolve_system(ctx.sim(), first)?;
        let b = resolve_system(ctx.sim(), second)?;
        if ctx.sim_mut().unlink(a, b)? {
            println!("航路を削除しました。次の tick で価格ネットワークを再構築します。");
        } else {
            println!("指定された星系間に航路はありません。");
        }
        Ok(())
    }
}

pub struct RefreshCommand;

impl Command for RefreshCommand {
    fn name() -> &'static str {
        "refresh"
    }

    fn execute(ctx: &mut Context<'_>, _args: Args<'_>) -> Result<()> {
        ctx.sim_mut().refresh()?;
        println!(
            "価格ネットワークを再構築しました (累計 {} 回)。",
            ctx.sim().economy().solver().rebuild_count()
        );
        Ok(())
    }
}

pub struct CreditsCommand;

impl Command for CreditsCommand {
    fn name() -> &'static str {
        "credits"
    }

    fn execute(_ctx: &mut Context<'_>, mut args: Args<'_>) -> Result<()> {
        let amount = parse_credits(args.next_required("金額を指定してください。")?)?;
        let decimals = match args.next() {
            Some(token) => token
                .parse()
                .map_err(|_| anyhow!("小数桁は整数で指定してください。"))?,
            None => PRICE_DECIMALS,
        };
        let available = args.next().map(parse_credits).transpose()?;
        print_credits(amount, decimals, available);
        Ok(())
    }
}

pub struct QuitCommand;

impl Command for QuitCommand {
    fn name() -> &'static str {
        "quit"
    }

    fn execute(_ctx: &mut Context<'_>, _args: Args<'_>) -> Result<()> {
        println!("シミュレーションを終了します。");
        process::exit(0);
    }
}

pub struct ExitCommand;

impl Command for ExitCommand {
    fn name() -> &'static str {
        "exit"
    }

    fn execute(ctx: &mut Context<'_>, args: Args<'_>) -> Result<()> {
        QuitCommand::execute(ctx, args)
    }
}
