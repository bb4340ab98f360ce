
#[derive(PartialEq)]
pub enum Language {
 Chinese,
 English
}

pub struct Texts {
  language : Language,
}

impl Texts {
 pub fn new(language : Language) -> Texts {
   Texts {language}
 }

 pub fn temperature<'a>(&self) -> &'a str {
     self.select("溫度", "Temperature")
 }

 pub fn humidity<'a>(&self) -> &'a str {
     self.select("濕度", "Humidity")
 }

 pub fn overview<'a>(&self) -> &'a str {
     self.select("即時溫濕度總覽", "Realtime overview")
 }

 pub fn trend_chart<'a>(&self) -> &'a str {
     self.select("溫濕度趨勢圖", "Daily trend")
 }

 pub fn refresh<'a>(&self) -> &'a str {
     self.select("重新整理", "Refresh")
 }

 pub fn settings<'a>(&self) -> &'a str {
     self.select("警報設定", "Alert settings")
 }

 pub fn mute<'a>(&self) -> &'a str {
     self.select("靜音警報 (1分鐘後自動停止)", "Mute alarm (auto-stops after 1 minute)")
 }

 pub fn unmute<'a>(&self) -> &'a str {
     self.select("警報已靜音", "Alarm muted")
 }

 pub fn last_updated<'a>(&self) -> &'a str {
     self.select("最後更新", "Last updated")
 }

 pub fn out_of_range<'a>(&self) -> &'a str {
     self.select("警告：數值超出設定範圍", "Warning: value out of configured range")
 }

 pub fn alerts_disabled<'a>(&self) -> &'a str {
     self.select("警報已停用", "Alerts disabled")
 }

 pub fn out_of_range_disabled<'a>(&self) -> &'a str {
     self.select("數值超出範圍（警報已停用）", "Out of range (alerts disabled)")
 }

 pub fn no_data<'a>(&self) -> &'a str {
     self.select("暫無即時數據", "No realtime data yet")
 }

 pub fn update_settings<'a>(&self) -> &'a str {
     self.select("更新設定", "Update settings")
 }

 pub fn add_unit<'a>(&self) -> &'a str {
     self.select("新增監測單位", "Add unit")
 }

 pub fn delete<'a>(&self) -> &'a str {
     self.select("刪除", "Delete")
 }

 pub fn unit_name<'a>(&self) -> &'a str {
     self.select("單位名稱", "Unit name")
 }

 pub fn load_error<'a>(&self) -> &'a str {
     self.select("載入數據時發生錯誤", "Error loading data")
 }

 fn select<'a>(&self, t1 : &'a str, t2: &'a str) -> &'a str
 {
     if self.language == Language::Chinese {
         t1
     } else {
         t2
     }
 }

}
