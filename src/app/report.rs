//! 文字摘要：命令列輸出的設施清單與專案概況。

use crate::domain::model::Project;

/// "<name> 約 <minutes> 分鐘 <type>"，未經校正的座標加註
pub fn poi_list_lines(project: &Project) -> Vec<String> {
    project
        .pois
        .iter()
        .map(|poi| {
            let mut line = format!("{} 約 {} 分鐘 {}", poi.name, poi.minutes, poi.kind);
            if poi.manual {
                line.push_str(" (AI 推估位置)");
            }
            line
        })
        .collect()
}

pub fn summary_lines(project: &Project) -> Vec<String> {
    let rings = project
        .ring_minutes
        .iter()
        .map(|m| m.to_string())
        .collect::<Vec<_>>()
        .join(" / ");

    let mut lines = vec![
        format!("案名: {}", project.name),
        format!("地址: {}", project.address),
        format!("中心: {}", project.center),
        format!("車程圈: {} 分鐘", rings),
        format!("重點設施 ({}):", project.pois.len()),
    ];
    lines.extend(poi_list_lines(project).into_iter().map(|l| format!("  - {}", l)));
    lines
}
