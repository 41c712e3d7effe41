use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "meridian", version, about = "原生合约测试场景执行器")]
pub struct Cli {
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "配置文件路径（默认查找 meridian.yaml、config/meridian.yaml 或 meridian.toml）"
    )]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// 列出已注册的场景
    List(ListCmd),
    /// 按名称依次执行场景
    Run(RunCmd),
    /// 钱包文件管理
    #[command(subcommand)]
    Wallet(WalletCmd),
    /// 初始化配置模版文件
    Init(InitCmd),
}

#[derive(Args, Debug)]
pub struct ListCmd {
    #[arg(long, value_name = "GROUP", help = "仅列出指定分组（side_chain / governance）")]
    pub group: Option<String>,
}

#[derive(Args, Debug)]
pub struct RunCmd {
    #[arg(required = true, value_name = "NAME", help = "场景名称，可指定多个")]
    pub names: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum WalletCmd {
    /// 生成新账户并写入加密钱包文件
    New(WalletNewArgs),
    /// 查看钱包文件中的地址与公钥
    Show(WalletShowArgs),
}

#[derive(Args, Debug)]
pub struct WalletNewArgs {
    #[arg(long, value_name = "FILE", help = "钱包文件输出路径")]
    pub output: PathBuf,
    #[arg(long, default_value = "", help = "钱包备注")]
    pub remark: String,
    #[arg(long, help = "若文件存在则覆盖")]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct WalletShowArgs {
    #[arg(value_name = "FILE", help = "钱包文件路径")]
    pub path: PathBuf,
    #[arg(long, help = "使用配置中的密码解锁并校验")]
    pub verify: bool,
}

#[derive(Args, Debug)]
pub struct InitCmd {
    #[arg(long, value_name = "DIR", help = "可选输出目录（默认当前目录）")]
    pub output: Option<PathBuf>,
    #[arg(long, help = "若文件存在则覆盖")]
    pub force: bool,
}
