//! The `mockexam init` command.

use std::path::Path;

use anyhow::Result;

pub fn execute() -> Result<()> {
    write_unless_exists("mockexam.toml", SAMPLE_CONFIG)?;
    write_unless_exists("curriculum.toml", EXAMPLE_CURRICULUM)?;

    println!("\nNext steps:");
    println!("  1. Set GEMINI_API_KEY or edit mockexam.toml");
    println!("  2. Run: mockexam validate --curriculum curriculum.toml");
    println!("  3. Run: mockexam take --curriculum curriculum.toml --grade m1 --topic m1-matter-particles");

    Ok(())
}

fn write_unless_exists(path: &str, content: &str) -> Result<()> {
    if Path::new(path).exists() {
        println!("{path} already exists, skipping.");
    } else {
        std::fs::write(path, content)?;
        println!("Created {path}");
    }
    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# mockexam configuration

provider = "gemini"
candidate_models = ["gemini-1.5-flash", "gemini-1.5-pro", "gemini-2.0-flash-exp", "gemini-pro"]
question_count = 40
min_viable_problems = 5
language = "Korean"
timeout_secs = 120

[providers.gemini]
type = "gemini"
api_key = "${GEMINI_API_KEY}"

[providers.openai]
type = "openai"
api_key = "${OPENAI_API_KEY}"
"#;

const EXAMPLE_CURRICULUM: &str = r#"[[grades]]
id = "m1"
grade = "중학교 1학년"

[[grades.subjects]]
id = "m1-science"
title = "과학"

[[grades.subjects.topics]]
id = "m1-matter-particles"
title = "물질의 구성"
content = """
물질은 원소로 이루어져 있으며, 원소는 더 이상 다른 물질로 분해되지 않는 기본 성분이다.
원자는 원자핵과 전자로 구성되고, 원자가 전자를 잃거나 얻으면 이온이 된다.
"""
video_reference = "https://www.youtube.com/results?search_query=중1+물질의+구성"

[[grades.subjects.topics]]
id = "m1-electricity"
title = "전기와 자기"
content = """
마찰 전기는 두 물체를 문지를 때 전자가 이동하여 생긴다.
전류의 세기는 전압에 비례하고 저항에 반비례한다(옴의 법칙).
"""

[[grades]]
id = "m3"
grade = "중학교 3학년"

[[grades.subjects]]
id = "m3-science"
title = "과학"

[[grades.subjects.topics]]
id = "m3-motion-energy"
title = "운동과 에너지"
content = """
자유 낙하하는 물체는 중력 가속도에 의해 속력이 일정하게 증가한다.
역학적 에너지는 위치 에너지와 운동 에너지의 합이며, 마찰이 없으면 보존된다.
"""
"#;
