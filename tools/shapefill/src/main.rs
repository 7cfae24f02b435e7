//! 形状插值命令行驱动.
//!
//! 读取稀疏标注的二值 nii 体数据, 做形状插值后写出稠密标注:
//!
//! ```text
//! shapefill <输入 nii> <输出 nii> [nn|linear|bspline]
//! ```
//!
//! 插值核缺省为 `linear`; 未知名称打印警告并回退为 `linear`.
//! 任一阶段失败时以非零状态码退出, 且不写输出文件.

use std::env;
use std::error::Error;
use std::process::ExitCode;

use ct_interp::prelude::*;

/// 解析命令行插值核名称, 未知名称回退为默认核.
fn pick_interpolator(name: Option<&str>) -> Interpolator {
    let Some(name) = name else {
        return Interpolator::default();
    };
    Interpolator::from_name(name).unwrap_or_else(|| {
        log::warn!("未知插值核 `{name}`, 回退为 linear. 可选: nn, linear, bspline");
        Interpolator::default()
    })
}

/// 实际运行: 读取, 插值, 写出.
fn run(input: &str, output: &str, kernel: Interpolator) -> Result<(), Box<dyn Error>> {
    log::info!("读取 {input} ...");
    let vol = LabelVolume::open(input)?;

    let config = InterpConfig::new(3, kernel)?;
    let dense = interpolate(&vol, &config)?;

    log::info!("写入 {output} ...");
    dense.save(output)?;
    Ok(())
}

fn main() -> ExitCode {
    simple_logger::init_with_level(log::Level::Info).expect("日志初始化失败");

    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        eprintln!("用法: {} <输入 nii> <输出 nii> [nn|linear|bspline]", args[0]);
        return ExitCode::FAILURE;
    }

    let kernel = pick_interpolator(args.get(3).map(String::as_str));
    match run(&args[1], &args[2], kernel) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("处理失败: {e}");
            ExitCode::FAILURE
        }
    }
}
