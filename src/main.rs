//! 程序入口：初始化日志并运行交互式命令行外壳

use std::io::{self, BufRead, Write};
use std::path::Path;

use tracing_subscriber::fmt::SubscriberBuilder;

use json_r_geshihua::model::path::{MatchStrategy, SearchMode};
use json_r_geshihua::model::shadow_tree::{NodeKind, RenderNode};
use json_r_geshihua::utils::clipboard::copy_to_clipboard;
use json_r_geshihua::utils::fs::write_text_file;
use json_r_geshihua::AppState;

fn main() {
    // 初始化日志输出
    let _ = SubscriberBuilder::default()
        .with_max_level(tracing::Level::INFO)
        .try_init();

    tracing::info!("JSON格式化工具启动成功");
    print_help();

    let mut state = AppState::default();
    let stdin = io::stdin();
    loop {
        print!("> ");
        let _ = io::stdout().flush();

        let mut line = String::new();
        match stdin.read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                eprintln!("读取输入失败: {}", e);
                break;
            }
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if !dispatch(&mut state, line) {
            break;
        }
    }
    tracing::info!("JSON格式化工具退出");
}

/// 解析并分发一条命令，返回 false 表示退出主循环
fn dispatch(state: &mut AppState, line: &str) -> bool {
    let (command, rest) = match line.split_once(' ') {
        Some((c, r)) => (c, r.trim()),
        None => (line, ""),
    };

    match command {
        ":quit" | ":q" => return false,
        ":help" => print_help(),
        ":load" => handle_load(state, rest),
        ":paste" => handle_paste(state),
        ":fmt" => handle_fmt(state, rest),
        ":nested" => match parse_switch(rest) {
            Some(on) => {
                state.set_expand_nested(on);
                print_tree(state);
            }
            None => println!("用法: :nested on|off"),
        },
        ":search" => {
            state.set_query(rest);
            report_matches(state);
        }
        ":mode" => match rest {
            "content" => {
                state.set_mode(SearchMode::Content);
                report_matches(state);
            }
            "path" => {
                state.set_mode(SearchMode::Path);
                report_matches(state);
            }
            _ => println!("用法: :mode content|path"),
        },
        ":strategy" => match rest {
            "contains" => {
                state.set_strategy(MatchStrategy::Contains);
                report_matches(state);
            }
            "exact" => {
                state.set_strategy(MatchStrategy::Exact);
                report_matches(state);
            }
            "regex" => {
                state.set_strategy(MatchStrategy::Regex);
                report_matches(state);
            }
            _ => println!("用法: :strategy contains|exact|regex"),
        },
        ":case" => match parse_switch(rest) {
            Some(on) => {
                state.set_case_sensitive(on);
                report_matches(state);
            }
            None => println!("用法: :case on|off"),
        },
        ":filter" => match parse_switch(rest) {
            Some(on) => {
                state.set_filter_mode(on);
                print_tree(state);
            }
            None => println!("用法: :filter on|off"),
        },
        ":next" => handle_navigate(state, true),
        ":prev" => handle_navigate(state, false),
        ":expand" => {
            state.expand_all();
            print_tree(state);
        }
        ":collapse" => {
            state.collapse_all();
            print_tree(state);
        }
        ":toggle" => {
            if rest.is_empty() {
                println!("用法: :toggle <路径>");
            } else {
                state.toggle_path(rest);
                print_tree(state);
            }
        }
        ":copy" => handle_copy(state),
        ":save" => handle_save(state, rest),
        _ => println!("未知命令: {}，输入 :help 查看帮助", command),
    }
    true
}

/// 处理文件加载
fn handle_load(state: &mut AppState, rest: &str) {
    if rest.is_empty() {
        println!("用法: :load <路径>");
        return;
    }
    match state.load_file(Path::new(rest)) {
        Ok(()) => {
            report_quote_hint(state);
            print_tree(state);
        }
        Err(e) => println!("{}", e),
    }
}

/// 多行粘贴：持续读入直到单独一行的 `.`
fn handle_paste(state: &mut AppState) {
    println!("粘贴JSON文本，单独一行输入 . 结束:");
    let stdin = io::stdin();
    let mut buffer = String::new();
    for line in stdin.lock().lines() {
        match line {
            Ok(l) if l.trim() == "." => break,
            Ok(l) => {
                buffer.push_str(&l);
                buffer.push('\n');
            }
            Err(e) => {
                eprintln!("读取输入失败: {}", e);
                return;
            }
        }
    }
    format_and_report(state, &buffer);
}

/// 处理内联格式化，参数留空时重新格式化已持有的输入
fn handle_fmt(state: &mut AppState, rest: &str) {
    if !rest.is_empty() {
        format_and_report(state, rest);
    } else if state.raw_input.trim().is_empty() {
        println!("没有可格式化的输入，使用 :paste 或 :fmt <json>");
    } else {
        let raw = state.raw_input.clone();
        format_and_report(state, &raw);
    }
}

fn format_and_report(state: &mut AppState, raw: &str) {
    match state.format_input(raw) {
        Ok(()) => {
            report_quote_hint(state);
            print_tree(state);
        }
        Err(e) => println!("{}", e),
    }
}

fn report_quote_hint(state: &AppState) {
    if state.quote_wrapped {
        println!("(检测到被引号包裹的JSON，已自动解包)");
    }
}

/// 在命中之间循环跳转并重绘
fn handle_navigate(state: &mut AppState, forward: bool) {
    let hit = if forward {
        state.next_match().map(|p| p.to_string())
    } else {
        state.prev_match().map(|p| p.to_string())
    };
    match hit {
        Some(path) => {
            println!("当前命中: {}", path);
            print_tree(state);
        }
        None => println!("没有可导航的命中"),
    }
}

fn handle_copy(state: &AppState) {
    match state.clipboard_payload() {
        Ok(payload) => match copy_to_clipboard(&payload) {
            Ok(()) => {
                tracing::info!("内容已复制到剪贴板，长度: {} 字符", payload.chars().count());
                println!("已复制，长度: {} 字符", payload.chars().count());
            }
            Err(e) => println!("复制失败: {}", e),
        },
        Err(e) => println!("{}", e),
    }
}

fn handle_save(state: &AppState, rest: &str) {
    if rest.is_empty() {
        println!("用法: :save <路径>");
        return;
    }
    let saved = state
        .stringify_current()
        .and_then(|text| write_text_file(Path::new(rest), &text));
    match saved {
        Ok(()) => {
            tracing::info!("JSON文件已保存到: {}", rest);
            println!("已保存到 {}", rest);
        }
        Err(e) => println!("保存失败: {}", e),
    }
}

fn report_matches(state: &AppState) {
    if state.options.query.trim().is_empty() {
        println!("已清空搜索");
    } else {
        println!("命中 {} 处", state.match_set.len());
    }
    print_tree(state);
}

fn print_tree(state: &AppState) {
    match state.render_tree() {
        Some(tree) => {
            let mut out = String::new();
            render_lines(&tree, 0, &mut out);
            print!("{}", out);
        }
        None => println!("(无可显示的节点)"),
    }
}

/// 把投影树逐行写成缩进文本，● 标记命中，◀ 标记当前命中
fn render_lines(node: &RenderNode, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    let arrow = if node.is_expandable {
        if node.is_expanded {
            "▾ "
        } else {
            "▸ "
        }
    } else {
        "  "
    };
    let key_part = match &node.key {
        Some(key) => format!("\"{}\": ", key),
        None => String::new(),
    };
    let comma = if node.is_last { "" } else { "," };
    let mut marks = String::new();
    if node.is_self_match {
        marks.push_str(" ●");
    }
    if node.is_active {
        marks.push_str(" ◀");
    }

    match &node.display {
        Some(text) => {
            out.push_str(&format!(
                "{}{}{}{}{}{}\n",
                indent, arrow, key_part, text, comma, marks
            ));
        }
        None => {
            // 展开的容器：起始括号一行，子节点缩进一层，结束括号一行
            let (open, close) = match node.kind {
                NodeKind::Array => ('[', ']'),
                _ => ('{', '}'),
            };
            out.push_str(&format!(
                "{}{}{}{}{}\n",
                indent, arrow, key_part, open, marks
            ));
            for child in &node.children {
                render_lines(child, depth + 1, out);
            }
            out.push_str(&format!("{}  {}{}\n", indent, close, comma));
        }
    }
}

fn parse_switch(rest: &str) -> Option<bool> {
    match rest {
        "on" => Some(true),
        "off" => Some(false),
        _ => None,
    }
}

fn print_help() {
    println!("可用命令:");
    println!("  :load <路径>                读取文件并格式化");
    println!("  :paste                      多行粘贴，单独一行 . 结束");
    println!("  :fmt [json]                 格式化内联输入，留空则重新格式化当前输入");
    println!("  :nested on|off              嵌套JSON字符串展开开关");
    println!("  :search <关键字>            设置搜索词，留空清除");
    println!("  :mode content|path          搜索模式切换");
    println!("  :strategy contains|exact|regex  匹配策略");
    println!("  :case on|off                大小写敏感开关");
    println!("  :filter on|off              过滤显示开关");
    println!("  :next / :prev               在命中之间循环跳转");
    println!("  :expand / :collapse         全部展开 / 全部折叠");
    println!("  :toggle <路径>              切换指定节点的展开状态");
    println!("  :copy                       复制格式化结果到剪贴板");
    println!("  :save <路径>                把格式化结果写入文件");
    println!("  :help                       显示本帮助");
    println!("  :quit                       退出");
}
