// GUI-subsystem binary on Windows: the editor never gets a console window.
// CLI mode (--input/-i present) attaches to the launching terminal instead.
#![windows_subsystem = "windows"]

use eframe::egui;
use tripaint::app::TriPaintApp;
use tripaint::cli;

fn main() -> Result<(), eframe::Error> {
    // -- CLI / headless mode ---------------------------------------------
    if cli::CliArgs::is_cli_mode() {
        use clap::Parser;
        #[cfg(target_os = "windows")]
        console::attach_parent();

        let args = cli::CliArgs::parse();
        let code = cli::run(args);
        std::process::exit(if code == std::process::ExitCode::SUCCESS {
            0
        } else {
            1
        });
    }

    // -- GUI mode -----------------------------------------------------

    // Initialize session log (overwrites previous session log)
    tripaint::logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([900.0, 760.0])
            .with_title("TriPaint"),
        ..Default::default()
    };

    eframe::run_native(
        "TriPaint",
        options,
        Box::new(|cc| Box::new(TriPaintApp::new(cc))),
    )
}

#[cfg(target_os = "windows")]
mod console {
    unsafe extern "system" {
        fn AttachConsole(process_id: u32) -> i32;
        fn SetStdHandle(std_handle: u32, handle: isize) -> i32;
        fn CreateFileW(
            file_name: *const u16,
            desired_access: u32,
            share_mode: u32,
            security_attributes: *const std::ffi::c_void,
            creation_disposition: u32,
            flags_and_attributes: u32,
            template_file: isize,
        ) -> isize;
    }

    const ATTACH_PARENT_PROCESS: u32 = 0xFFFF_FFFF;
    const GENERIC_READ: u32 = 0x8000_0000;
    const GENERIC_WRITE: u32 = 0x4000_0000;
    const FILE_SHARE_READ_WRITE: u32 = 0x0000_0003;
    const OPEN_EXISTING: u32 = 3;
    const STD_INPUT_HANDLE: u32 = -10i32 as u32;
    const STD_OUTPUT_HANDLE: u32 = -11i32 as u32;
    const STD_ERROR_HANDLE: u32 = -12i32 as u32;
    const INVALID_HANDLE_VALUE: isize = -1;

    /// Open a console device (`CONOUT$` / `CONIN$`) for the given access.
    fn open_device(name: &str, access: u32) -> Option<isize> {
        let wide: Vec<u16> = name.encode_utf16().chain(std::iter::once(0)).collect();
        let handle = unsafe {
            CreateFileW(
                wide.as_ptr(),
                access,
                FILE_SHARE_READ_WRITE,
                std::ptr::null(),
                OPEN_EXISTING,
                0,
                0,
            )
        };
        (handle != INVALID_HANDLE_VALUE).then_some(handle)
    }

    /// Attach to the parent terminal and point stdio at it.
    pub fn attach_parent() {
        unsafe {
            AttachConsole(ATTACH_PARENT_PROCESS);
        }
        if let Some(out) = open_device("CONOUT$", GENERIC_WRITE) {
            unsafe {
                SetStdHandle(STD_OUTPUT_HANDLE, out);
                SetStdHandle(STD_ERROR_HANDLE, out);
            }
        }
        if let Some(input) = open_device("CONIN$", GENERIC_READ) {
            unsafe {
                SetStdHandle(STD_INPUT_HANDLE, input);
            }
        }
    }
}
