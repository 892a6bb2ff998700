pub const TITLE_ART: &str = r#"
  ______    _           _
 |  ____|  | |         | |
 | |__ __ _| |__  _   _| | __ _
 |  __/ _` | '_ \| | | | |/ _` |
 | | | (_| | |_) | |_| | | (_| |
 |_|  \__,_|_.__/ \__,_|_|\__,_|

      stories, one turn at a time
"#;
