use std::fs::Metadata;

const SETUID: u32 = 0o4000;
const SETGID: u32 = 0o2000;
const STICKY: u32 = 0o1000;

/// Renders file metadata as an `ls -l` style type-and-permission string,
/// e.g. `drwxr-xr-x` or `-rw-r--r--`.
pub trait ModeStringExt {
    fn mode_string(&self) -> String;
}

impl ModeStringExt for Metadata {
    #[cfg(unix)]
    fn mode_string(&self) -> String {
        use std::os::unix::fs::{FileTypeExt, PermissionsExt};

        let file_type = self.file_type();
        let type_char = if file_type.is_dir() {
            'd'
        } else if file_type.is_symlink() {
            'l'
        } else if file_type.is_char_device() {
            'c'
        } else if file_type.is_block_device() {
            'b'
        } else if file_type.is_fifo() {
            'p'
        } else if file_type.is_socket() {
            's'
        } else {
            '-'
        };

        render_mode(type_char, self.permissions().mode())
    }

    #[cfg(not(unix))]
    fn mode_string(&self) -> String {
        let file_type = self.file_type();
        let type_char = if file_type.is_dir() {
            'd'
        } else if file_type.is_symlink() {
            'l'
        } else {
            '-'
        };
        let bits = if self.permissions().readonly() {
            0o444
        } else {
            0o666
        };

        render_mode(type_char, bits)
    }
}

fn render_mode(type_char: char, mode: u32) -> String {
    let mut rendered = String::with_capacity(10);
    rendered.push(type_char);

    // (read bit, write bit, execute bit, special bit, special char when executable)
    let classes = [
        (0o400, 0o200, 0o100, SETUID, 's'),
        (0o040, 0o020, 0o010, SETGID, 's'),
        (0o004, 0o002, 0o001, STICKY, 't'),
    ];

    for (read, write, execute, special, special_char) in classes {
        rendered.push(if mode & read != 0 { 'r' } else { '-' });
        rendered.push(if mode & write != 0 { 'w' } else { '-' });
        rendered.push(match (mode & execute != 0, mode & special != 0) {
            (true, true) => special_char,
            (false, true) => special_char.to_ascii_uppercase(),
            (true, false) => 'x',
            (false, false) => '-',
        });
    }

    rendered
}
